pub mod core;
pub mod harvest;
pub mod scraping;
pub mod store;

// --- Primary core exports ---
pub use crate::core::config;
pub use crate::core::types;
pub use crate::core::types::*;

// --- Convenience re-exports ---
pub use harvest::InmateHarvester;
pub use scraping::{browser_manager, PortalSession, SessionError, SessionOptions};
pub use store::{Category, CsvStore};
