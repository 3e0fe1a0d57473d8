//! The normalized charity record returned by every regulator client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Regulator;

/// Registration status, reduced to the states all three registers share.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CharityStatus {
    /// On the register. Also the fallback for unrecognised status strings.
    #[default]
    Registered,

    /// Removed from the register.
    Removed,

    /// Registered but overdue with annual filings.
    Late,
}

impl std::fmt::Display for CharityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CharityStatus::Registered => "registered",
                CharityStatus::Removed => "removed",
                CharityStatus::Late => "late",
            }
        )
    }
}

/// A charity, normalized across CCEW, OSCR and CCNI.
///
/// Every field is always serialized. Anything a register does not provide is
/// `null` (or `[]` for lists), so consumers can rely on the full shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Charity {
    /// Canonical cross-register identifier, e.g. `GB-CHC-1234567`.
    pub id: String,

    /// Bare register number as the regulator issues it.
    pub registration_number: String,

    pub regulator: Regulator,

    pub name: String,

    /// Working names and former names.
    pub other_names: Vec<String>,

    pub company_number: Option<String>,

    /// Legal form, e.g. "CIO" or "Trust".
    pub charity_type: Option<String>,

    pub status: CharityStatus,

    pub date_registered: Option<NaiveDate>,

    pub date_removed: Option<NaiveDate>,

    pub removal_reason: Option<String>,

    /// Single-line postal address.
    pub address: Option<String>,

    pub postcode: Option<String>,

    pub phone: Option<String>,

    pub email: Option<String>,

    pub website: Option<String>,

    /// End of the latest reported financial year.
    pub financial_year_end: Option<NaiveDate>,

    /// Total income for the latest reported year, in pounds.
    pub income: Option<f64>,

    /// Total expenditure for the latest reported year, in pounds.
    pub expenditure: Option<f64>,

    pub employees: Option<u32>,

    pub volunteers: Option<u32>,

    /// Number of trustees.
    pub trustees: Option<u32>,

    /// What the charity does.
    pub causes: Vec<String>,

    /// Who the charity helps.
    pub beneficiaries: Vec<String>,

    /// How the charity works.
    pub operations: Vec<String>,

    /// Where the charity operates.
    pub areas_of_operation: Vec<String>,

    pub governing_document: Option<String>,

    pub charitable_objects: Option<String>,

    /// Free-text description of activities.
    pub activities: Option<String>,

    /// The regulator payload this record was built from.
    pub raw: serde_json::Value,
}

impl Charity {
    /// Creates a record with identity set and every other field unknown.
    pub fn new(
        regulator: Regulator,
        registration_number: impl Into<String>,
        name: impl Into<String>,
        raw: serde_json::Value,
    ) -> Self {
        let registration_number = registration_number.into();
        Charity {
            id: regulator.canonical_id(&registration_number),
            registration_number,
            regulator,
            name: name.into(),
            other_names: Vec::new(),
            company_number: None,
            charity_type: None,
            status: CharityStatus::default(),
            date_registered: None,
            date_removed: None,
            removal_reason: None,
            address: None,
            postcode: None,
            phone: None,
            email: None,
            website: None,
            financial_year_end: None,
            income: None,
            expenditure: None,
            employees: None,
            volunteers: None,
            trustees: None,
            causes: Vec::new(),
            beneficiaries: Vec::new(),
            operations: Vec::new(),
            areas_of_operation: Vec::new(),
            governing_document: None,
            charitable_objects: None,
            activities: None,
            raw,
        }
    }
}
