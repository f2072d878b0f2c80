//! Maps every way a request can fail into a single [`ApiError`].
//!
//! The mapping is pure and total: each [`Failure`] yields exactly one
//! normalized error with a non-empty kind and message.

use super::status;
use crate::error::{ApiError, ErrorKind};
use serde_json::Value;

pub const MSG_DEFAULT: &str = "An unexpected error occurred";
pub const MSG_BAD_REQUEST: &str = "Invalid request. Please check your input.";
pub const MSG_UNAUTHORIZED: &str = "Session expired. Please sign in again.";
pub const MSG_FORBIDDEN: &str = "You do not have permission to perform this action.";
pub const MSG_NOT_FOUND: &str = "The requested resource was not found.";
pub const MSG_CONFLICT: &str = "A conflict occurred. Please try again.";
pub const MSG_UNPROCESSABLE: &str = "Invalid data provided.";
pub const MSG_TOKEN_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const MSG_SERVER: &str = "Server error. Please try again later.";
pub const MSG_UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection and try again.";

/// A caught request failure, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The server answered with a non-2xx status.
    Response { status: u16, body: Option<Value> },
    /// The request went out but nothing came back (unreachable, timeout).
    NoResponse { reason: String },
    /// Anything else: malformed request, undecodable body.
    Other { message: Option<String> },
}

/// Normalize a failure into the uniform error shape.
pub fn normalize(failure: &Failure) -> ApiError {
    match failure {
        Failure::Response { status, body } => normalize_status(*status, body.as_ref()),
        Failure::NoResponse { .. } => ApiError::new(ErrorKind::Network, MSG_NETWORK),
        Failure::Other { message } => {
            let message = message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(MSG_DEFAULT);
            ApiError::new(ErrorKind::Unknown, message)
        }
    }
}

fn normalize_status(code: u16, body: Option<&Value>) -> ApiError {
    let server_message = body.and_then(body_message);
    let or_server = |fallback: &str| server_message.clone().unwrap_or_else(|| fallback.to_string());

    let (kind, message) = match code {
        status::BAD_REQUEST => (ErrorKind::Validation, or_server(MSG_BAD_REQUEST)),
        status::UNAUTHORIZED => (ErrorKind::Auth, MSG_UNAUTHORIZED.to_string()),
        status::FORBIDDEN => (ErrorKind::Forbidden, MSG_FORBIDDEN.to_string()),
        status::NOT_FOUND => (ErrorKind::NotFound, MSG_NOT_FOUND.to_string()),
        status::CONFLICT => (ErrorKind::Conflict, or_server(MSG_CONFLICT)),
        status::UNPROCESSABLE_ENTITY => (ErrorKind::Validation, or_server(MSG_UNPROCESSABLE)),
        status::TOKEN_EXPIRED => (ErrorKind::Auth, MSG_TOKEN_EXPIRED.to_string()),
        status::INTERNAL_SERVER_ERROR => (ErrorKind::Server, MSG_SERVER.to_string()),
        status::SERVICE_UNAVAILABLE => (ErrorKind::Server, MSG_UNAVAILABLE.to_string()),
        other if status::is_server_error(other) => (ErrorKind::Server, or_server(&generic(other))),
        other => (ErrorKind::Unknown, or_server(&generic(other))),
    };

    ApiError::new(kind, message)
        .with_status(code)
        .with_body(body.cloned())
}

fn generic(code: u16) -> String {
    format!("Error {}: Something went wrong.", code)
}

/// Pull `message` out of an error body, if the server supplied one.
pub fn body_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Classify a reqwest failure that carries no decoded response body.
pub fn classify_reqwest(error: &reqwest::Error) -> Failure {
    if let Some(code) = error.status() {
        return Failure::Response {
            status: code.as_u16(),
            body: None,
        };
    }
    if error.is_timeout() || error.is_connect() || error.is_request() {
        return Failure::NoResponse {
            reason: error.to_string(),
        };
    }
    Failure::Other {
        message: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Option<Value>) -> ApiError {
        normalize(&Failure::Response { status, body })
    }

    #[test]
    fn test_every_recognized_status_produces_one_error() {
        let cases = [
            (400, ErrorKind::Validation),
            (401, ErrorKind::Auth),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::Conflict),
            (422, ErrorKind::Validation),
            (498, ErrorKind::Auth),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
        ];
        for (code, kind) in cases {
            let err = response(code, None);
            assert_eq!(err.kind, kind, "status {}", code);
            assert_eq!(err.status, Some(code));
            assert!(!err.message.is_empty());
            assert!(!err.kind.as_str().is_empty());
        }
    }

    #[test]
    fn test_bad_request_prefers_server_message() {
        let err = response(400, Some(json!({"message": "Email already taken"})));
        assert_eq!(err.message, "Email already taken");
        assert_eq!(err.body, Some(json!({"message": "Email already taken"})));

        let err = response(400, Some(json!({"errors": []})));
        assert_eq!(err.message, MSG_BAD_REQUEST);
    }

    #[test]
    fn test_unauthorized_ignores_server_message() {
        let err = response(401, Some(json!({"message": "jwt malformed"})));
        assert_eq!(err.message, MSG_UNAUTHORIZED);
        assert!(err.is_auth());
    }

    #[test]
    fn test_token_expired_is_auth_kind() {
        let err = response(498, None);
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(err.message, MSG_TOKEN_EXPIRED);
    }

    #[test]
    fn test_unlisted_statuses_fall_back_to_generic_message() {
        let err = response(502, None);
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.message, "Error 502: Something went wrong.");

        let err = response(405, Some(json!({"message": "Use POST"})));
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.message, "Use POST");
    }

    #[test]
    fn test_no_response_is_network_kind() {
        let err = normalize(&Failure::NoResponse {
            reason: "connection refused".to_string(),
        });
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.message, MSG_NETWORK);
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_other_failures_use_underlying_message() {
        let err = normalize(&Failure::Other {
            message: Some("builder error".to_string()),
        });
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.message, "builder error");

        let err = normalize(&Failure::Other { message: None });
        assert_eq!(err.message, MSG_DEFAULT);

        let err = normalize(&Failure::Other {
            message: Some("   ".to_string()),
        });
        assert_eq!(err.message, MSG_DEFAULT);
    }
}
