//! # qick-core
//!
//! Session, state store and REST client for the Qick sports-booking app.
//!
//! This crate holds everything below the user interface: the HTTP client
//! that talks to the Qick backend, the error normalizer every failure goes
//! through, and the single state tree with its slices and persistence.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qick_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> qick_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let store = Store::rehydrate(FileStorage::default_location()?, PersistConfig::default());
//!
//!     let auth = AuthService::connect(ClientSettings::from_config(&config), store.clone())?;
//!     let request = LoginRequest {
//!         identifier: OtpIdentifier::email("ana@example.com"),
//!         password: "secret".to_string(),
//!     };
//!     auth.login(&request).await?;
//!
//!     assert!(store.session().is_authenticated);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           API Layer                 │  HTTP client, interceptors, normalizer
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  Services sequencing store + API
//! ├─────────────────────────────────────┤
//! │          Store Layer                │  Slices, reducers, persistence
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  Configuration, snapshot backends
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  Form validation
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Session rules
//!
//! - A 401 or 498 from any call resets the whole store before the caller
//!   sees the error.
//! - Only the session slice is written to durable storage, under `root`.
//! - Logout returns every slice to its initial state.

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use qick_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::{ApiError, AppError, ErrorKind, ValidationError};

    pub use crate::api::client::{ClientSettings, HttpClient};
    pub use crate::api::endpoints::auth::{AuthApi, LoginRequest, OtpIdentifier, SignupRequest};
    pub use crate::api::models::UserProfile;
    pub use crate::api::request::{MultipartBody, Payload, RequestOptions};

    pub use crate::core::services::auth_service::AuthService;

    pub use crate::store::persist::PersistConfig;
    pub use crate::store::session::SessionAction;
    pub use crate::store::{Action, RootState, Store};

    pub use crate::storage::config::Config;
    pub use crate::storage::state::{FileStorage, KeyringStorage, MemoryStorage, StateStorage};
}

/// API layer - REST client and wire models.
///
/// - [`api::client`]: HTTP client with its interceptor chain
/// - [`api::normalizer`]: Failure to [`error::ApiError`] mapping
/// - [`api::endpoints`]: Typed `/auth/*` calls
pub mod api;

/// Business logic layer.
pub mod core;

/// Store layer - the single state tree.
///
/// - [`store::session`]: Authentication slice
/// - [`store::home`], [`store::facility`], [`store::booking`]: Screen slices
/// - [`store::persist`]: Selective persistence of the tree
pub mod store;

/// Storage layer - configuration and snapshot backends.
pub mod storage;

/// Utilities layer.
pub mod utils;

/// Error handling - hierarchical error system.
///
/// Provides structured error handling:
/// - Domain-specific error variants (API, Auth, Config, Storage, Validation)
/// - Severity levels (Critical, High, Medium, Low)
/// - Troubleshooting hints for common issues
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
