//! Buyer commands (write operations)

pub mod add_note;
pub mod create;
pub mod delete;
pub mod import_csv;
pub mod update;
pub mod update_status;
