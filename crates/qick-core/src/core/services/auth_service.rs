use super::types::AuthStatus;
use crate::AppError;
use crate::api::client::{ClientSettings, HttpClient};
use crate::api::endpoints::auth::{
    AppleLoginRequest, AuthApi, AuthResponse, AvatarUpload, GoogleLoginRequest, LoginRequest,
    MessageResponse, OtpIdentifier, ResetPasswordRequest, SignupRequest, VerifyOtpRequest,
};
use crate::api::models::UserProfile;
use crate::error::{ApiError, AuthError, ValidationError};
use crate::store::Store;
use crate::store::session::{AuthPayload, ProfilePatch, SessionAction, SessionState};
use log::{info, warn};
use std::future::Future;

/// Which set of session transitions brackets a sign-in call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Login,
    Signup,
}

impl Flow {
    fn start(self) -> SessionAction {
        match self {
            Flow::Login => SessionAction::LoginStart,
            Flow::Signup => SessionAction::SignupStart,
        }
    }

    fn success(self, payload: AuthPayload) -> SessionAction {
        match self {
            Flow::Login => SessionAction::LoginSuccess(payload),
            Flow::Signup => SessionAction::SignupSuccess(payload),
        }
    }

    fn failure(self, message: String) -> SessionAction {
        match self {
            Flow::Login => SessionAction::LoginFailure(message),
            Flow::Signup => SessionAction::SignupFailure(message),
        }
    }
}

/// Authentication service: validates input, calls `/auth/*` and records
/// the outcome in the session slice.
pub struct AuthService {
    api: AuthApi,
    store: Store,
}

impl AuthService {
    pub fn new(api: AuthApi, store: Store) -> Self {
        Self { api, store }
    }

    /// Service with a client wired to `store` (bearer token, forced logout).
    pub fn connect(settings: ClientSettings, store: Store) -> Result<Self, AppError> {
        let client = HttpClient::for_store(settings, &store)?;
        Ok(Self::new(AuthApi::new(client), store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn sign_in<F>(&self, flow: Flow, call: F) -> Result<UserProfile, AppError>
    where
        F: Future<Output = Result<AuthResponse, ApiError>>,
    {
        self.store.dispatch(flow.start());
        match call.await {
            Ok(response) => {
                let payload = AuthPayload::from(response);
                let user = payload.user_data.clone();
                self.store.dispatch(flow.success(payload));
                info!("signed in as {}", user.display_name());
                Ok(user)
            }
            Err(e) => {
                self.store.dispatch(flow.failure(e.message.clone()));
                Err(e.into())
            }
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<UserProfile, AppError> {
        request.validate()?;
        self.sign_in(Flow::Login, self.api.login(request)).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<UserProfile, AppError> {
        request.validate()?;
        self.sign_in(Flow::Signup, self.api.signup(request)).await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<UserProfile, AppError> {
        request.validate()?;
        self.sign_in(Flow::Login, self.api.verify_otp(request)).await
    }

    pub async fn google_login(&self, id_token: &str) -> Result<UserProfile, AppError> {
        if id_token.trim().is_empty() {
            return Err(ValidationError::single("idToken", "Google token is required").into());
        }
        let request = GoogleLoginRequest {
            id_token: id_token.to_string(),
        };
        self.sign_in(Flow::Login, self.api.google_login(&request))
            .await
    }

    pub async fn apple_login(&self, request: &AppleLoginRequest) -> Result<UserProfile, AppError> {
        if request.identity_token.trim().is_empty() {
            return Err(
                ValidationError::single("identityToken", "Apple token is required").into(),
            );
        }
        self.sign_in(Flow::Login, self.api.apple_login(request))
            .await
    }

    pub async fn resend_otp(&self, identifier: &OtpIdentifier) -> Result<MessageResponse, AppError> {
        identifier.validate()?;
        Ok(self.api.resend_otp(identifier).await?)
    }

    pub async fn forgot_password(
        &self,
        identifier: &OtpIdentifier,
    ) -> Result<MessageResponse, AppError> {
        identifier.validate()?;
        Ok(self.api.forgot_password(identifier).await?)
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        request.validate()?;
        Ok(self.api.reset_password(request).await?)
    }

    fn require_session(&self) -> Result<SessionState, AuthError> {
        let session = self.store.session();
        if session.is_authenticated {
            Ok(session)
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Exchange the stored refresh token for a new token pair.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let session = self.require_session()?;
        let refresh_token = session
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let pair = self.api.refresh_token(&refresh_token).await?;
        self.store.dispatch(SessionAction::TokenRefreshed {
            token: pair.token,
            refresh_token: pair.refresh_token,
        });
        Ok(())
    }

    /// Fetch the profile from the server and merge it into the session.
    pub async fn get_profile(&self) -> Result<UserProfile, AppError> {
        self.require_session()?;
        let response = self.api.get_profile().await?;
        self.store
            .dispatch(SessionAction::UpdateProfile(ProfilePatch::from(&response.user)));
        Ok(response.user)
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, AppError> {
        self.require_session()?;
        if patch.is_empty() {
            return Err(ValidationError::single("profile", "Nothing to update").into());
        }
        let response = self.api.update_profile(patch).await?;
        self.store
            .dispatch(SessionAction::UpdateProfile(ProfilePatch::from(&response.user)));
        Ok(response.user)
    }

    pub async fn update_avatar(
        &self,
        patch: &ProfilePatch,
        avatar: AvatarUpload,
    ) -> Result<UserProfile, AppError> {
        self.require_session()?;
        let response = self.api.update_profile_with_avatar(patch, avatar).await?;
        self.store
            .dispatch(SessionAction::UpdateProfile(ProfilePatch::from(&response.user)));
        Ok(response.user)
    }

    /// Tell the server, then reset the whole store.
    ///
    /// The server call is best-effort; the local reset always happens.
    pub async fn logout(&self) -> Result<(), AppError> {
        if self.store.session().is_authenticated {
            if let Err(e) = self.api.logout().await {
                warn!("server logout failed, signing out locally: {}", e);
            }
        }
        self.store.dispatch(SessionAction::Logout);
        Ok(())
    }

    pub fn status(&self) -> AuthStatus {
        let session = self.store.session();
        AuthStatus {
            is_authenticated: session.is_authenticated,
            phase: session.phase(),
            display_name: session.user_data.as_ref().map(UserProfile::display_name),
            has_refresh_token: session.refresh_token.is_some(),
            last_error: session.error.clone(),
            persistent: self.store.is_persistent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::session::SessionPhase;

    fn service() -> AuthService {
        // nothing listens here; tests below must fail before the network
        AuthService::connect(ClientSettings::new("http://127.0.0.1:9"), Store::default())
            .expect("client creation failed")
    }

    #[tokio::test]
    async fn test_invalid_login_never_touches_session() {
        let service = service();
        let request = LoginRequest {
            identifier: OtpIdentifier::email("not-an-email"),
            password: "secret".to_string(),
        };

        let err = service.login(&request).await.expect_err("should fail");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.store().session(), SessionState::default());
    }

    #[tokio::test]
    async fn test_refresh_requires_session() {
        let err = service().refresh().await.expect_err("should fail");
        assert!(matches!(err, AppError::Auth(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let service = service();
        service.store().dispatch(SessionAction::LoginSuccess(AuthPayload {
            user_data: UserProfile {
                id: "u1".to_string(),
                ..Default::default()
            },
            token: "t1".to_string(),
            refresh_token: None,
        }));

        let err = service.refresh().await.expect_err("should fail");
        assert!(matches!(err, AppError::Auth(AuthError::MissingRefreshToken)));
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_skips_server() {
        let service = service();
        service.logout().await.expect("local logout always succeeds");
        assert!(!service.status().is_authenticated);
    }

    #[test]
    fn test_status_of_fresh_store() {
        let status = service().status();
        assert_eq!(status.phase, SessionPhase::Anonymous);
        assert_eq!(status.display_name, None);
        assert!(!status.persistent);
    }
}
