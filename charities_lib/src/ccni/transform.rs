//! CCNI payloads to normalized records.

use charities_api::types::{Charity, CharityStatus, Regulator, Trustee};
use serde_json::Value;

use crate::normalize::{
    count, date, first_text, is_placeholder, number, string_list, text, website,
};
use crate::validation::ccni_number;

pub fn status(raw: Option<&str>) -> CharityStatus {
    let lower = raw.unwrap_or_default().trim().to_ascii_lowercase();
    if lower == "removed" {
        CharityStatus::Removed
    } else if lower.contains("late") {
        CharityStatus::Late
    } else {
        CharityStatus::Registered
    }
}

/// A charity object from `getCharityDetails` or a `search` row.
pub fn charity(raw: Value) -> Option<Charity> {
    if is_placeholder(&raw) {
        return None;
    }
    let reg_number = text(&raw, "regCharityNumber").and_then(|n| ccni_number(&n))?;
    let name = text(&raw, "charityName")?;
    let mut c = Charity::new(Regulator::Ccni, reg_number, name, Value::Null);

    c.other_names = string_list(&raw, "otherNames", None);
    c.company_number = text(&raw, "companyNumber");
    c.charity_type = text(&raw, "charityType");

    c.status = status(text(&raw, "status").as_deref());
    c.date_registered = date(&raw, "dateRegistered");
    c.date_removed = date(&raw, "dateRemoved");
    c.removal_reason = text(&raw, "removalReason");

    c.address = text(&raw, "publicAddress");
    c.postcode = text(&raw, "postcode");
    c.phone = first_text(&raw, &["telephone", "phone"]);
    c.email = text(&raw, "email");
    c.website = website(&raw, "website");

    c.financial_year_end = date(&raw, "financialYearEnd");
    c.income = number(&raw, "totalIncome");
    c.expenditure = number(&raw, "totalSpending");

    c.employees = count(&raw, "employees");
    c.volunteers = count(&raw, "volunteers");
    c.trustees = count(&raw, "trusteeCount");

    c.causes = string_list(&raw, "whatTheCharityDoes", None);
    c.beneficiaries = string_list(&raw, "whoTheCharityHelps", None);
    c.operations = string_list(&raw, "howTheCharityWorks", None);
    c.areas_of_operation = string_list(&raw, "areasOfOperation", None);

    c.governing_document = text(&raw, "governingDocument");
    c.charitable_objects = text(&raw, "charitablePurposes");
    c.activities = text(&raw, "activities");

    c.raw = raw;
    Some(c)
}

/// A `getTrustees` row.
pub fn trustee(raw: &Value) -> Option<Trustee> {
    let role = text(raw, "trusteeRole");
    let is_chair = role
        .as_deref()
        .is_some_and(|r| r.to_ascii_lowercase().contains("chair"));
    Some(Trustee {
        id: None,
        name: text(raw, "trusteeName")?,
        role,
        is_chair,
        appointed: date(raw, "dateAppointed"),
        kind: None,
    })
}
