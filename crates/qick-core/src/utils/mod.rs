//! Utils module - Shared utilities and helpers

/// Input validation for configuration values and auth forms
pub mod validation;
