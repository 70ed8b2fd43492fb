//! Buyer queries (read operations)

pub mod export_csv;
pub mod get;
pub mod history;
pub mod list;
