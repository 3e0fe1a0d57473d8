//! CCEW payloads to normalized records.

use charities_api::types::{Charity, CharityStatus, FinancialYear, OtherRegulator, Regulator, Trustee};
use serde_json::Value;

use crate::normalize::{
    count, date, first_text, flag, is_placeholder, join_lines, number, string_list, text, website,
};
use crate::validation::ccew_number;

/// `reg_status` codes: `R` registered, `RM` removed.
pub fn status(code: Option<&str>) -> CharityStatus {
    match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
        Some("RM") => CharityStatus::Removed,
        _ => CharityStatus::Registered,
    }
}

fn identity(raw: &Value) -> Option<(String, String)> {
    let reg_number = text(raw, "reg_charity_number").and_then(|n| ccew_number(&n))?;
    let name = text(raw, "charity_name")?;
    Some((reg_number, name))
}

/// True for rows describing a linked subsidiary rather than the main charity.
fn is_subsidiary(raw: &Value) -> bool {
    number(raw, "group_subsid_suffix").is_some_and(|suffix| suffix != 0.0)
}

/// Full record from `allcharitydetailsV2`. `None` for a placeholder body.
pub fn charity(raw: Value) -> Option<Charity> {
    if is_placeholder(&raw) {
        return None;
    }
    let (reg_number, name) = identity(&raw)?;
    let mut c = Charity::new(Regulator::Ccew, reg_number, name, Value::Null);

    c.other_names = string_list(&raw, "other_names", Some("other_name"));
    c.company_number = text(&raw, "charity_co_reg_number");
    c.charity_type = text(&raw, "charity_type");

    c.status = status(text(&raw, "reg_status").as_deref());
    c.date_registered = date(&raw, "date_of_registration");
    c.date_removed = date(&raw, "date_of_removal");
    c.removal_reason = text(&raw, "removal_reason");

    c.address = join_lines(
        [
            "address_line_one",
            "address_line_two",
            "address_line_three",
            "address_line_four",
            "address_line_five",
        ]
        .iter()
        .map(|key| text(&raw, key)),
    );
    c.postcode = text(&raw, "address_post_code");
    c.phone = text(&raw, "phone");
    c.email = text(&raw, "email");
    c.website = website(&raw, "web");

    c.financial_year_end = date(&raw, "latest_acc_fin_year_end_date");
    c.income = number(&raw, "latest_income");
    c.expenditure = number(&raw, "latest_expenditure");

    c.employees = count(&raw, "employees");
    c.volunteers = count(&raw, "volunteers");
    c.trustees = count(&raw, "trustees");

    let (causes, beneficiaries, operations, areas) = classifications(&raw);
    c.causes = causes;
    c.beneficiaries = beneficiaries;
    c.operations = operations;
    c.areas_of_operation = areas;

    c.governing_document = text(&raw, "governing_document");
    c.charitable_objects = text(&raw, "charitable_objects");
    c.activities = first_text(&raw, &["charity_activities", "activities"]);

    c.raw = raw;
    Some(c)
}

type Classifications = (Vec<String>, Vec<String>, Vec<String>, Vec<String>);

/// Splits `who_what_where` entries into what / who / how / where lists.
fn classifications(raw: &Value) -> Classifications {
    let mut out: Classifications = Default::default();
    let Some(Value::Array(entries)) = raw.get("who_what_where") else {
        return out;
    };
    for entry in entries {
        let Some(desc) = text(entry, "classification_desc") else {
            continue;
        };
        let kind = text(entry, "classification_type").unwrap_or_default();
        let bucket = match kind.to_ascii_lowercase().as_str() {
            "what" => &mut out.0,
            "who" => &mut out.1,
            "how" => &mut out.2,
            "where" => &mut out.3,
            _ => continue,
        };
        if !bucket.contains(&desc) {
            bucket.push(desc);
        }
    }
    out
}

/// A `searchCharityName` row. Subsidiary rows are skipped.
pub fn search_row(raw: Value) -> Option<Charity> {
    if is_placeholder(&raw) || is_subsidiary(&raw) {
        return None;
    }
    let (reg_number, name) = identity(&raw)?;
    let mut c = Charity::new(Regulator::Ccew, reg_number, name, Value::Null);
    c.status = status(text(&raw, "reg_status").as_deref());
    c.date_registered = date(&raw, "date_of_registration");
    c.date_removed = date(&raw, "date_of_removal");
    c.raw = raw;
    Some(c)
}

/// A `charitytrusteeinformationV2` row.
pub fn trustee(raw: &Value) -> Option<Trustee> {
    let kind = text(raw, "individual_or_organisation").map(|k| match k.as_str() {
        "P" => "Individual".to_string(),
        "O" => "Organisation".to_string(),
        _ => k,
    });
    Some(Trustee {
        id: text(raw, "trustee_id"),
        name: text(raw, "trustee_name")?,
        role: if flag(raw, "trustee_is_chair") {
            Some("Chair".to_string())
        } else {
            None
        },
        is_chair: flag(raw, "trustee_is_chair"),
        appointed: date(raw, "date_of_appointment"),
        kind,
    })
}

/// A `charityfinancialhistory` row.
pub fn financial_year(raw: &Value) -> FinancialYear {
    FinancialYear {
        year_start: date(raw, "financial_period_start_date"),
        year_end: date(raw, "financial_period_end_date"),
        income: number(raw, "income").or_else(|| number(raw, "total_gross_income")),
        expenditure: number(raw, "expenditure")
            .or_else(|| number(raw, "total_gross_expenditure")),
        employees: count(raw, "employees"),
        volunteers: count(raw, "volunteers"),
    }
}

/// A `charityotherregulators` row.
pub fn other_regulator(raw: &Value) -> Option<OtherRegulator> {
    Some(OtherRegulator {
        name: text(raw, "regulator_name")?,
        url: text(raw, "regulator_web_url"),
    })
}
