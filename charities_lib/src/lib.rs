//! Regulator clients for the UK charity registers.
//!
//! Wraps the `charities_api` request core with one client per register
//! (England and Wales, Scotland, Northern Ireland), each mapping its
//! register's payloads onto the shared [`Charity`] record.

pub mod ccew;
pub mod ccni;
pub mod normalize;
pub mod oscr;
pub mod regulator;
pub mod validation;

pub use charities_api;
pub use charities_api::types;
pub use charities_api::{ClientConfig, ConfigError, Error, SearchQuery};

pub use ccew::CcewClient;
pub use ccni::CcniClient;
pub use oscr::OscrClient;
pub use regulator::CharityRegulator;
pub use types::{Charity, CharityStatus, FinancialYear, OtherRegulator, Regulator, SearchResult, Trustee};

/// Builds the client for `regulator` as a trait object.
pub fn client_for(
    regulator: Regulator,
    config: ClientConfig,
) -> Result<Box<dyn CharityRegulator>, ConfigError> {
    Ok(match regulator {
        Regulator::Ccew => Box::new(CcewClient::new(config)?),
        Regulator::Oscr => Box::new(OscrClient::new(config)?),
        Regulator::Ccni => Box::new(CcniClient::new(config)?),
    })
}
