//! Services that sequence store transitions around API calls.

pub mod auth_service;
pub mod types;
