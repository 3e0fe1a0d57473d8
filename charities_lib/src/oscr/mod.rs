//! Office of the Scottish Charity Regulator.

mod client;
pub mod transform;

pub use client::{OscrClient, DEFAULT_BASE_URL, OSCR_PAGE_SIZE};
