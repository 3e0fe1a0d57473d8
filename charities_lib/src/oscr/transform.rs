//! OSCR payloads to normalized records.

use charities_api::types::{Charity, CharityStatus, FinancialYear, Regulator};
use serde_json::Value;

use crate::normalize::{count, date, first_text, is_placeholder, number, string_list, text, website};
use crate::validation::oscr_number;

pub fn status(raw: Option<&str>) -> CharityStatus {
    let Some(raw) = raw else {
        return CharityStatus::Registered;
    };
    let lower = raw.trim().to_ascii_lowercase();
    match lower.as_str() {
        "active" | "registered" => CharityStatus::Registered,
        "removed" | "ceased" => CharityStatus::Removed,
        s if s.contains("default") || s.contains("late") => CharityStatus::Late,
        _ => CharityStatus::Registered,
    }
}

/// The internal record id OSCR uses to key annual returns.
pub fn record_id(raw: &Value) -> Option<String> {
    text(raw, "id")
}

/// A charity object, from either the single-charity or the list endpoint.
pub fn charity(raw: Value) -> Option<Charity> {
    if is_placeholder(&raw) {
        return None;
    }
    let reg_number = text(&raw, "charityNumber").and_then(|n| oscr_number(&n))?;
    let name = text(&raw, "charityName")?;
    let mut c = Charity::new(Regulator::Oscr, reg_number, name, Value::Null);

    c.other_names = string_list(&raw, "knownAs", None);
    c.charity_type = text(&raw, "constitutionalForm");

    c.status = status(text(&raw, "charityStatus").as_deref());
    c.date_registered = date(&raw, "registeredDate");
    c.date_removed = date(&raw, "ceasedDate");
    c.removal_reason = text(&raw, "ceasedReason");

    c.address = text(&raw, "principalOfficeTrusteesAddress");
    c.postcode = text(&raw, "postcode");
    c.website = website(&raw, "website");

    c.income = number(&raw, "mostRecentYearIncome");
    c.expenditure = number(&raw, "mostRecentYearExpenditure");

    c.causes = string_list(&raw, "purposes", None);
    c.beneficiaries = string_list(&raw, "beneficiaries", None);
    c.operations = string_list(&raw, "activities", None);
    let mut areas = string_list(&raw, "mainOperatingLocation", None);
    for area in string_list(&raw, "geographicalSpread", None) {
        if !areas.contains(&area) {
            areas.push(area);
        }
    }
    c.areas_of_operation = areas;

    c.governing_document = text(&raw, "governingDocument");
    c.charitable_objects = first_text(&raw, &["objectives", "charitableObjects"]);

    c.raw = raw;
    Some(c)
}

/// One annual-return row.
pub fn financial_year(raw: &Value) -> Option<FinancialYear> {
    if is_placeholder(raw) {
        return None;
    }
    Some(FinancialYear {
        year_start: date(raw, "FinancialYearStart"),
        year_end: date(raw, "FinancialYearEnd"),
        income: number(raw, "GrossIncome"),
        expenditure: number(raw, "GrossExpenditure"),
        employees: count(raw, "Employees"),
        volunteers: count(raw, "Volunteers"),
    })
}

/// Fills the financial and people fields the primary record lacks from the
/// latest year in `years`. Fields already present are kept.
pub fn enrich(mut charity: Charity, years: &[FinancialYear]) -> Charity {
    let Some(latest) = years.iter().max_by_key(|y| y.year_end) else {
        return charity;
    };
    if charity.financial_year_end.is_none() {
        charity.financial_year_end = latest.year_end;
    }
    if charity.income.is_none() {
        charity.income = latest.income;
    }
    if charity.expenditure.is_none() {
        charity.expenditure = latest.expenditure;
    }
    if charity.employees.is_none() {
        charity.employees = latest.employees;
    }
    if charity.volunteers.is_none() {
        charity.volunteers = latest.volunteers;
    }
    charity
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "id": 42,
            "charityNumber": "SC012345",
            "charityName": "Highland Hospice",
            "registeredDate": "1984-03-01T00:00:00",
            "knownAs": "The Hospice",
            "charityStatus": "Active",
            "postcode": "IV2 3UP",
            "principalOfficeTrusteesAddress": "Bishops Road, Inverness",
            "website": "highlandhospice.org",
            "mostRecentYearIncome": 9100000,
            "mostRecentYearExpenditure": null,
            "mainOperatingLocation": "Highland",
            "geographicalSpread": "Highland; Moray",
            "purposes": "[\"The advancement of health\"]",
            "beneficiaries": "People with disabilities or health problems",
            "activities": "It provides services",
            "objectives": "To provide palliative care",
            "constitutionalForm": "Company"
        })
    }

    #[test]
    fn maps_a_charity_record() {
        let c = charity(fixture()).unwrap();
        assert_eq!(c.id, "GB-SC-SC012345");
        assert_eq!(c.registration_number, "SC012345");
        assert_eq!(c.regulator, Regulator::Oscr);
        assert_eq!(c.other_names, vec!["The Hospice"]);
        assert_eq!(c.status, CharityStatus::Registered);
        assert_eq!(c.date_registered, NaiveDate::from_ymd_opt(1984, 3, 1));
        assert_eq!(c.website.as_deref(), Some("https://highlandhospice.org"));
        assert_eq!(c.income, Some(9_100_000.0));
        assert_eq!(c.expenditure, None);
        assert_eq!(c.causes, vec!["The advancement of health"]);
        assert_eq!(c.areas_of_operation, vec!["Highland", "Moray"]);
        assert_eq!(c.charitable_objects.as_deref(), Some("To provide palliative care"));
        assert_eq!(record_id(&c.raw).as_deref(), Some("42"));
    }

    #[test]
    fn status_strings() {
        assert_eq!(status(Some("Active")), CharityStatus::Registered);
        assert_eq!(status(Some("Registered")), CharityStatus::Registered);
        assert_eq!(status(Some("Removed")), CharityStatus::Removed);
        assert_eq!(status(Some("Ceased")), CharityStatus::Removed);
        assert_eq!(status(Some("In Default")), CharityStatus::Late);
        assert_eq!(status(Some("Accounts late")), CharityStatus::Late);
        assert_eq!(status(Some("Mystery")), CharityStatus::Registered);
        assert_eq!(status(None), CharityStatus::Registered);
    }

    fn year(end: (i32, u32, u32), income: f64) -> FinancialYear {
        FinancialYear {
            year_start: None,
            year_end: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            income: Some(income),
            expenditure: Some(income / 2.0),
            employees: Some(10),
            volunteers: None,
        }
    }

    #[test]
    fn enrich_fills_only_missing_fields_from_latest_year() {
        let c = charity(fixture()).unwrap();
        let years = vec![year((2022, 3, 31), 1.0), year((2023, 3, 31), 2.0)];
        let enriched = enrich(c.clone(), &years);
        assert_eq!(enriched.income, c.income);
        assert_eq!(enriched.expenditure, Some(1.0));
        assert_eq!(enriched.financial_year_end, NaiveDate::from_ymd_opt(2023, 3, 31));
        assert_eq!(enriched.employees, Some(10));
        assert_eq!(enriched.volunteers, None);
    }

    #[test]
    fn enrich_with_no_years_is_identity() {
        let c = charity(fixture()).unwrap();
        assert_eq!(enrich(c.clone(), &[]), c);
    }

    #[test]
    fn annual_return_rows() {
        let y = financial_year(&json!({
            "FinancialYearStart": "2022-04-01T00:00:00",
            "FinancialYearEnd": "2023-03-31T00:00:00",
            "GrossIncome": "1,000",
            "GrossExpenditure": 900,
            "Employees": 3,
            "Volunteers": "12"
        }))
        .unwrap();
        assert_eq!(y.year_end, NaiveDate::from_ymd_opt(2023, 3, 31));
        assert_eq!(y.income, Some(1000.0));
        assert_eq!(y.volunteers, Some(12));
        assert!(financial_year(&json!({})).is_none());
    }

    #[test]
    fn records_without_number_or_name_are_dropped() {
        assert!(charity(json!({"charityName": "x"})).is_none());
        assert!(charity(json!({"charityNumber": "SC1"})).is_none());
        assert!(charity(json!(null)).is_none());
    }
}
