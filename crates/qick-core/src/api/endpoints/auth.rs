//! `/auth/*` resource: credentials, OTP, social sign-in, tokens and profile.

use crate::api::client::HttpClient;
use crate::api::models::UserProfile;
use crate::api::request::{MultipartBody, Payload};
use crate::error::{ApiError, ValidationError};
use crate::store::session::{AuthPayload, ProfilePatch};
use crate::utils::validation::{
    FormCheck, MIN_PASSWORD_LEN, validate_email, validate_password, validate_phone,
    validate_required,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const LOGIN: &str = "/auth/login";
pub const SIGNUP: &str = "/auth/signup";
pub const VERIFY_OTP: &str = "/auth/verify-otp";
pub const RESEND_OTP: &str = "/auth/resend-otp";
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/auth/reset-password";
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const LOGOUT: &str = "/auth/logout";
pub const PROFILE: &str = "/auth/profile";
pub const GOOGLE_LOGIN: &str = "/auth/google";
pub const APPLE_LOGIN: &str = "/auth/apple";

/// Either an email or a phone number identifies the account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OtpIdentifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl OtpIdentifier {
    pub fn email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            phone: None,
        }
    }

    pub fn phone(phone: &str) -> Self {
        Self {
            email: None,
            phone: Some(phone.to_string()),
        }
    }

    fn check(&self, form: FormCheck) -> FormCheck {
        match (&self.email, &self.phone) {
            (None, None) => form.field("email", Some("Email or phone number is required".to_string())),
            (email, phone) => form
                .field("email", email.as_deref().and_then(validate_email))
                .field("phone", phone.as_deref().and_then(validate_phone)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check(FormCheck::new()).finish()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LoginRequest {
    #[serde(flatten)]
    pub identifier: OtpIdentifier,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identifier
            .check(FormCheck::new())
            .field("password", validate_password(&self.password, 1))
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignupRequest {
    pub name: String,
    #[serde(flatten)]
    pub identifier: OtpIdentifier,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identifier
            .check(FormCheck::new())
            .field("name", validate_required(&self.name, "Name"))
            .field(
                "password",
                validate_password(&self.password, MIN_PASSWORD_LEN),
            )
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VerifyOtpRequest {
    #[serde(flatten)]
    pub identifier: OtpIdentifier,
    pub otp: String,
}

impl VerifyOtpRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identifier
            .check(FormCheck::new())
            .field("otp", validate_required(&self.otp, "Code"))
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(flatten)]
    pub identifier: OtpIdentifier,
    pub otp: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identifier
            .check(FormCheck::new())
            .field("otp", validate_required(&self.otp, "Code"))
            .field(
                "newPassword",
                validate_password(&self.new_password, MIN_PASSWORD_LEN),
            )
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppleName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct AppleUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<AppleName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppleLoginRequest {
    pub identity_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AppleUser>,
}

/// Body of every endpoint that signs a user in.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<AuthResponse> for AuthPayload {
    fn from(response: AuthResponse) -> Self {
        AuthPayload {
            user_data: response.user,
            token: response.token,
            refresh_token: response.refresh_token,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MessageResponse {
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Image attached to a profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: HttpClient,
}

impl AuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client
            .create(LOGIN, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.client
            .create(SIGNUP, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<AuthResponse, ApiError> {
        self.client
            .create(VERIFY_OTP, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn resend_otp(&self, identifier: &OtpIdentifier) -> Result<MessageResponse, ApiError> {
        self.client
            .create(RESEND_OTP, Some(Payload::json(identifier)?), None)
            .await
    }

    pub async fn forgot_password(
        &self,
        identifier: &OtpIdentifier,
    ) -> Result<MessageResponse, ApiError> {
        self.client
            .create(FORGOT_PASSWORD, Some(Payload::json(identifier)?), None)
            .await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.client
            .create(RESET_PASSWORD, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn google_login(
        &self,
        request: &GoogleLoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.client
            .create(GOOGLE_LOGIN, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn apple_login(&self, request: &AppleLoginRequest) -> Result<AuthResponse, ApiError> {
        self.client
            .create(APPLE_LOGIN, Some(Payload::json(request)?), None)
            .await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let body = json!({ "refreshToken": refresh_token });
        self.client
            .create(REFRESH_TOKEN, Some(body.into()), None)
            .await
    }

    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.client
            .create(LOGOUT, Some(json!({}).into()), None)
            .await
    }

    pub async fn get_profile(&self) -> Result<ProfileResponse, ApiError> {
        self.client.fetch(PROFILE, None, None).await
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<ProfileResponse, ApiError> {
        self.client
            .partial_update(PROFILE, Some(Payload::json(patch)?), None)
            .await
    }

    /// Same as [`AuthApi::update_profile`] but sent as a multipart form with
    /// the image under the `avatar` field.
    pub async fn update_profile_with_avatar(
        &self,
        patch: &ProfilePatch,
        avatar: AvatarUpload,
    ) -> Result<ProfileResponse, ApiError> {
        let mut form = MultipartBody::new();
        let fields = [
            ("firstName", &patch.first_name),
            ("lastName", &patch.last_name),
            ("email", &patch.email),
            ("phone", &patch.phone),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                form = form.text(name, value.clone());
            }
        }
        form = form.file("avatar", &avatar.file_name, &avatar.mime, avatar.bytes);

        self.client
            .partial_update(PROFILE, Some(form.into()), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_wire_shape() {
        let request = LoginRequest {
            identifier: OtpIdentifier::email("ana@example.com"),
            password: "secret".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialization failed");
        assert_eq!(
            value,
            json!({"email": "ana@example.com", "password": "secret"})
        );
    }

    #[test]
    fn test_login_requires_identifier_and_password() {
        let request = LoginRequest {
            identifier: OtpIdentifier::default(),
            password: String::new(),
        };
        let err = request.validate().expect_err("empty form should fail");
        assert!(err.message_for("email").is_some());
        assert_eq!(err.message_for("password"), Some("Password is required"));
    }

    #[test]
    fn test_signup_enforces_password_length() {
        let request = SignupRequest {
            name: "Ana".to_string(),
            identifier: OtpIdentifier::phone("+34 600 123 456"),
            password: "12345".to_string(),
        };
        let err = request.validate().expect_err("short password should fail");
        assert_eq!(
            err.message_for("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(err.fields.len(), 1);
    }

    #[test]
    fn test_signup_reports_bad_email() {
        let request = SignupRequest {
            name: " ".to_string(),
            identifier: OtpIdentifier::email("ana@"),
            password: "longenough".to_string(),
        };
        let err = request.validate().expect_err("form should fail");
        assert_eq!(err.message_for("name"), Some("Name is required"));
        assert_eq!(
            err.message_for("email"),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_auth_response_decodes_optional_refresh_token() {
        let response: AuthResponse = serde_json::from_value(json!({
            "user": {"_id": "u1", "email": "ana@example.com"},
            "token": "t1",
            "message": "Account created"
        }))
        .expect("decode failed");
        let payload = AuthPayload::from(response);
        assert_eq!(payload.user_data.id, "u1");
        assert_eq!(payload.token, "t1");
        assert_eq!(payload.refresh_token, None);
    }

    #[test]
    fn test_apple_request_omits_missing_user() {
        let request = AppleLoginRequest {
            identity_token: "id".to_string(),
            user: None,
        };
        let value = serde_json::to_value(&request).expect("serialization failed");
        assert_eq!(value, json!({"identityToken": "id"}));
    }
}
