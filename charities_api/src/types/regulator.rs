//! The three UK charity regulators.

use serde::{Deserialize, Serialize};

/// A national charity regulator whose register this crate can query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regulator {
    /// Charity Commission for England and Wales.
    #[serde(rename = "CCEW")]
    Ccew,

    /// Office of the Scottish Charity Regulator.
    #[serde(rename = "OSCR")]
    Oscr,

    /// Charity Commission for Northern Ireland.
    #[serde(rename = "CCNI")]
    Ccni,
}

impl Regulator {
    /// Short code used in logs and cache keys.
    pub fn code(&self) -> &'static str {
        match self {
            Regulator::Ccew => "CCEW",
            Regulator::Oscr => "OSCR",
            Regulator::Ccni => "CCNI",
        }
    }

    /// Prefix of the canonical cross-register identifier (org-id scheme).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Regulator::Ccew => "GB-CHC-",
            Regulator::Oscr => "GB-SC-",
            Regulator::Ccni => "GB-NIC-",
        }
    }

    /// Builds the canonical identifier for a bare registration number.
    pub fn canonical_id(&self, registration_number: &str) -> String {
        format!("{}{}", self.id_prefix(), registration_number)
    }
}

impl std::fmt::Display for Regulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Regulator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ccew" | "ew" | "england" => Ok(Regulator::Ccew),
            "oscr" | "sc" | "scotland" => Ok(Regulator::Oscr),
            "ccni" | "ni" | "northern-ireland" => Ok(Regulator::Ccni),
            other => Err(format!("unknown regulator: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ids() {
        assert_eq!(Regulator::Ccew.canonical_id("1234567"), "GB-CHC-1234567");
        assert_eq!(Regulator::Oscr.canonical_id("SC012345"), "GB-SC-SC012345");
        assert_eq!(Regulator::Ccni.canonical_id("100002"), "GB-NIC-100002");
    }

    #[test]
    fn parse_regulator_names() {
        assert_eq!("OSCR".parse::<Regulator>().unwrap(), Regulator::Oscr);
        assert_eq!(" ccni ".parse::<Regulator>().unwrap(), Regulator::Ccni);
        assert!("fca".parse::<Regulator>().is_err());
    }
}
