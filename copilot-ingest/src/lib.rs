//! copilot-ingest: CSV reading, cell coercion and the record normalizer that
//! produces the canonical transaction table.

pub mod coerce;
pub mod normalizer;
pub mod types;

pub use normalizer::{load_csv, mark_recurring, normalize};
pub use types::RawTable;
