//! copilot-core: transaction types, category labels, errors and settings
//! shared by the ingest and finance crates

pub mod category;
pub mod config;
pub mod error;
pub mod month;
pub mod transaction;

pub use category::{Category, OTHER, display_label};
pub use config::Settings;
pub use error::{Error, Result};
pub use month::YearMonth;
pub use transaction::{SignConvention, Transaction};

/// Default merchant for rows that arrive without one
pub const MISC_MERCHANT: &str = "Misc";
