//! Hooks run around every request, in the order they were registered.

use super::request::Transport;
use crate::error::ApiError;
use crate::store::Store;
use crate::store::session::SessionAction;
use log::{debug, info, warn};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// Request as seen by the interceptors, just before it is sent.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub transport: Transport,
    pub headers: HeaderMap,
}

impl OutgoingRequest {
    pub fn has_bearer(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    pub method: Method,
    pub url: String,
    pub status: u16,
}

pub trait Interceptor: Send + Sync {
    fn on_request(&self, _request: &mut OutgoingRequest) {}

    fn on_response(&self, _response: &ResponseInfo) {}

    /// Runs before the error is handed back to the caller.
    fn on_error(&self, _request: &OutgoingRequest, _error: &ApiError) {}
}

/// Adds `Authorization: Bearer <token>` from the current session.
pub struct BearerAuth {
    store: Store,
}

impl BearerAuth {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Interceptor for BearerAuth {
    fn on_request(&self, request: &mut OutgoingRequest) {
        let Some(token) = self.store.bearer_token() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("session token is not a valid header value; sending unauthenticated"),
        }
    }
}

/// Forces a full store reset when the server rejects the session
/// (401 or 498).
pub struct SessionReset {
    store: Store,
}

impl SessionReset {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Interceptor for SessionReset {
    fn on_error(&self, request: &OutgoingRequest, error: &ApiError) {
        if error.is_auth() {
            info!(
                "{} {} answered {:?}; signing out",
                request.method, request.url, error.status
            );
            self.store.dispatch(SessionAction::Logout);
        }
    }
}

/// Debug logging of traffic. Never prints header values.
pub struct DiagnosticLog;

impl Interceptor for DiagnosticLog {
    fn on_request(&self, request: &mut OutgoingRequest) {
        debug!(
            "→ {} {} ({}, bearer: {})",
            request.method,
            request.url,
            request.transport.content_type(),
            request.has_bearer()
        );
    }

    fn on_response(&self, response: &ResponseInfo) {
        debug!("← {} {} {}", response.status, response.method, response.url);
    }

    fn on_error(&self, request: &OutgoingRequest, error: &ApiError) {
        warn!(
            "✗ {} {} [{}{}] {}",
            request.method,
            request.url,
            error.kind,
            error
                .status
                .map(|s| format!(" {}", s))
                .unwrap_or_default(),
            error.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::UserProfile;
    use crate::error::ErrorKind;
    use crate::store::session::AuthPayload;

    fn outgoing() -> OutgoingRequest {
        OutgoingRequest {
            method: Method::GET,
            url: "http://example.test/auth/profile".to_string(),
            transport: Transport::Json,
            headers: HeaderMap::new(),
        }
    }

    fn signed_in_store() -> Store {
        let store = Store::default();
        store.dispatch(SessionAction::LoginSuccess(AuthPayload {
            user_data: UserProfile {
                id: "u1".to_string(),
                ..Default::default()
            },
            token: "t1".to_string(),
            refresh_token: None,
        }));
        store
    }

    #[test]
    fn test_bearer_auth_skips_anonymous_session() {
        let mut request = outgoing();
        BearerAuth::new(Store::default()).on_request(&mut request);
        assert!(!request.has_bearer());
    }

    #[test]
    fn test_bearer_auth_attaches_token() {
        let mut request = outgoing();
        BearerAuth::new(signed_in_store()).on_request(&mut request);
        let value = request
            .headers
            .get(AUTHORIZATION)
            .expect("authorization header should be set");
        assert_eq!(value.to_str().expect("ascii header"), "Bearer t1");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_session_reset_only_on_auth_errors() {
        let store = signed_in_store();
        let hook = SessionReset::new(store.clone());

        hook.on_error(
            &outgoing(),
            &ApiError::new(ErrorKind::Forbidden, "no").with_status(403),
        );
        assert!(store.session().is_authenticated);

        hook.on_error(
            &outgoing(),
            &ApiError::new(ErrorKind::Auth, "expired").with_status(498),
        );
        assert!(!store.session().is_authenticated);
    }

    #[test]
    fn test_session_reset_on_unauthorized() {
        let store = signed_in_store();
        SessionReset::new(store.clone()).on_error(
            &outgoing(),
            &ApiError::new(ErrorKind::Auth, "no session").with_status(401),
        );
        assert!(!store.session().is_authenticated);
        assert_eq!(store.bearer_token(), None);
    }
}
