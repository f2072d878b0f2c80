use crate::store::session::SessionPhase;

/// Summary of the local session for status output.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub phase: SessionPhase,
    pub display_name: Option<String>,
    pub has_refresh_token: bool,
    pub last_error: Option<String>,
    pub persistent: bool,
}
