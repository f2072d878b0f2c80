//! Authentication slice.
//!
//! `is_authenticated` holds iff both `user_data` and `token` are present.
//! Every transition keeps that true; failure and logout clear user data,
//! token and refresh token together.

use crate::api::models::UserProfile;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user_data: Option<UserProfile>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// In-flight flag; never written to durable storage.
    #[serde(skip)]
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Coarse lifecycle position derived from the slice fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.is_loading {
            SessionPhase::Authenticating
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Whether the fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == (self.user_data.is_some() && self.token.is_some())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Successful authentication result carried by login/signup success.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthPayload {
    pub user_data: UserProfile,
    pub token: String,
    pub refresh_token: Option<String>,
}

/// Partial profile update; `None` leaves the field untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self == &ProfilePatch::default()
    }

    pub fn apply_to(&self, user: &mut UserProfile) {
        if let Some(v) = &self.first_name {
            user.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = &self.phone {
            user.phone = v.clone();
        }
        if let Some(v) = &self.avatar {
            user.avatar = Some(v.clone());
        }
        if let Some(v) = self.is_verified {
            user.is_verified = v;
        }
    }
}

impl From<&UserProfile> for ProfilePatch {
    fn from(user: &UserProfile) -> Self {
        Self {
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            email: Some(user.email.clone()),
            phone: Some(user.phone.clone()),
            avatar: user.avatar.clone(),
            is_verified: Some(user.is_verified),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoginStart,
    LoginSuccess(AuthPayload),
    LoginFailure(String),
    SignupStart,
    SignupSuccess(AuthPayload),
    SignupFailure(String),
    /// Reserved: resets the whole store, not just this slice.
    Logout,
    UpdateProfile(ProfilePatch),
    TokenRefreshed {
        token: String,
        refresh_token: Option<String>,
    },
    ClearError,
    SetLoading(bool),
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::LoginStart => "loginStart",
            SessionAction::LoginSuccess(_) => "loginSuccess",
            SessionAction::LoginFailure(_) => "loginFailure",
            SessionAction::SignupStart => "signupStart",
            SessionAction::SignupSuccess(_) => "signupSuccess",
            SessionAction::SignupFailure(_) => "signupFailure",
            SessionAction::Logout => "logout",
            SessionAction::UpdateProfile(_) => "updateProfile",
            SessionAction::TokenRefreshed { .. } => "tokenRefreshed",
            SessionAction::ClearError => "clearError",
            SessionAction::SetLoading(_) => "setLoading",
        }
    }
}

pub fn reduce(state: SessionState, action: &SessionAction) -> SessionState {
    match action {
        SessionAction::LoginStart | SessionAction::SignupStart => SessionState {
            is_loading: true,
            error: None,
            ..state
        },
        SessionAction::LoginSuccess(payload) | SessionAction::SignupSuccess(payload) => {
            SessionState {
                is_authenticated: true,
                user_data: Some(payload.user_data.clone()),
                token: Some(payload.token.clone()),
                refresh_token: payload.refresh_token.clone(),
                is_loading: false,
                error: None,
            }
        }
        SessionAction::LoginFailure(message) | SessionAction::SignupFailure(message) => {
            SessionState {
                is_authenticated: false,
                user_data: None,
                token: None,
                refresh_token: None,
                is_loading: false,
                error: Some(message.clone()),
            }
        }
        SessionAction::Logout => SessionState::default(),
        SessionAction::UpdateProfile(patch) => {
            let mut next = state;
            if let Some(user) = next.user_data.as_mut() {
                patch.apply_to(user);
            }
            next
        }
        SessionAction::TokenRefreshed {
            token,
            refresh_token,
        } => {
            if !state.is_authenticated {
                return state;
            }
            SessionState {
                token: Some(token.clone()),
                refresh_token: refresh_token.clone().or(state.refresh_token.clone()),
                ..state
            }
        }
        SessionAction::ClearError => SessionState {
            error: None,
            ..state
        },
        SessionAction::SetLoading(loading) => SessionState {
            is_loading: *loading,
            ..state
        },
    }
}
