//! Buyer change history
//!
//! Append-only trail of mutations to buyer records. Entries reference the
//! buyer by id without a foreign key so the trail survives deletion of the
//! buyer itself. Writes are best-effort: a failed history insert is logged
//! and never fails the mutation that produced it.

pub mod models;
pub mod queries;

pub use models::{HistoryAction, HistoryEntry, NewHistoryEntry};
pub use queries::{insert_entry, list_for_buyer, record};
