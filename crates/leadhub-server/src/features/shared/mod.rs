//! Shared feature utilities

pub mod pagination;
pub mod validation;
