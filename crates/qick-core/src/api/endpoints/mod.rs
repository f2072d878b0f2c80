//! Typed wrappers over the backend's REST resources.

pub mod auth;

pub use auth::AuthApi;
