//! Secondary record types: trustees, financial history, other regulators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trustee of a charity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trustee {
    /// Regulator-assigned trustee identifier, where one exists.
    pub id: Option<String>,
    pub name: String,
    pub role: Option<String>,
    pub is_chair: bool,
    /// Date of appointment.
    pub appointed: Option<NaiveDate>,
    /// "Individual" or "Organisation" when the register says.
    pub kind: Option<String>,
}

/// One reported financial year.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialYear {
    pub year_start: Option<NaiveDate>,
    pub year_end: Option<NaiveDate>,
    pub income: Option<f64>,
    pub expenditure: Option<f64>,
    pub employees: Option<u32>,
    pub volunteers: Option<u32>,
}

/// Another body that regulates the same charity (e.g. a housing regulator).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtherRegulator {
    pub name: String,
    pub url: Option<String>,
}
