//! Charity Commission for Northern Ireland.

mod client;
pub mod transform;

pub use client::{CcniClient, DEFAULT_BASE_URL};
