//! API layer
//!
//! Response envelopes and the HTTP-facing application error type shared by
//! every feature route.

pub mod response;

pub use response::{ApiResponse, ApiResult, AppError, ErrorResponse};
