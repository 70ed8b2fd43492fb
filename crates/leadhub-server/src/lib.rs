//! LeadHub Server Library
//!
//! HTTP backend for a buyer-lead CRM.
//!
//! # Overview
//!
//! The LeadHub server provides a REST API for managing buyer leads:
//!
//! - **Buyers**: CRUD, status updates, note append, CSV import/export
//! - **History**: append-only audit trail, one entry per accepted mutation
//! - **Users**: admin-only listing and role management
//! - **Dashboard**: admin-only aggregate statistics
//!
//! # Architecture
//!
//! Feature slices follow a CQRS split:
//!
//! - **Commands** (write operations): create, update, delete, status change,
//!   note append, CSV import. Every accepted command appends one row to
//!   `buyer_history` before the response is returned.
//! - **Queries** (read operations): get, list, export, history. Not recorded
//!   in history.
//!
//! Authorization is centralized in [`auth`]: a single extractor resolves the
//! caller's identity and role, and a single owner-or-admin guard is applied
//! before every buyer read and mutation instead of per-handler copies.
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework
//! - **SQLx**: PostgreSQL access
//! - **Tower / tower-http**: middleware (CORS, tracing, compression)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod history;
pub mod middleware;

// Re-export commonly used types
pub use error::{ServerError, ServerResult};
