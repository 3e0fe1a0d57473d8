//! Charity Commission for England and Wales.

mod client;
pub mod transform;

pub use client::{CcewClient, DEFAULT_BASE_URL};
