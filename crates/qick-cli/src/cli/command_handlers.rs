use crate::cli::main_types::{AuthCommands, ConfigCommands, IdentifierArgs, StateCommands};
use log::debug;
use qick_core::api::endpoints::auth::{
    AvatarUpload, LoginRequest, OtpIdentifier, ResetPasswordRequest, SignupRequest,
    VerifyOtpRequest,
};
use qick_core::api::models::UserProfile;
use qick_core::core::services::auth_service::AuthService;
use qick_core::error::{AppError, CliError};
use qick_core::storage::config::{Config, StorageBackend};
use qick_core::store::Store;
use qick_core::store::persist::{self, PersistConfig};
use qick_core::store::session::{ProfilePatch, SessionAction};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

fn read_secret(prompt: &str) -> Result<String, AppError> {
    let secret = rpassword::prompt_password(prompt).map_err(|e| {
        AppError::Cli(CliError::InvalidArguments(format!(
            "Failed to read password: {}",
            e
        )))
    })?;
    Ok(secret.trim().to_string())
}

fn secret_or_prompt(value: Option<String>, prompt: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v),
        None => read_secret(prompt),
    }
}

fn identifier(args: IdentifierArgs) -> OtpIdentifier {
    OtpIdentifier {
        email: args.email,
        phone: args.phone,
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn read_avatar(path: &Path) -> Result<AvatarUpload, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Cli(CliError::InvalidArguments(format!(
            "Cannot read avatar '{}': {}",
            path.display(),
            e
        )))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "avatar".to_string());
    Ok(AvatarUpload {
        file_name,
        mime: mime_for(path).to_string(),
        bytes,
    })
}

fn print_profile(user: &UserProfile) {
    println!("Profile:");
    println!("========");
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.display_name());
    if !user.email.is_empty() {
        println!("  Email: {}", user.email);
    }
    if !user.phone.is_empty() {
        println!("  Phone: {}", user.phone);
    }
    if let Some(avatar) = &user.avatar {
        println!("  Avatar: {}", avatar);
    }
    println!("  Verified: {}", if user.is_verified { "Yes" } else { "No" });
}

fn print_message(message: Option<String>, fallback: &str) {
    println!("✅ {}", message.unwrap_or_else(|| fallback.to_string()));
}

#[derive(Default)]
pub struct AuthHandler;

impl AuthHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: AuthCommands,
        service: &AuthService,
    ) -> Result<(), AppError> {
        match command {
            AuthCommands::Login {
                identifier: id,
                password,
            } => {
                let request = LoginRequest {
                    identifier: identifier(id),
                    password: secret_or_prompt(password, "Password: ")?,
                };
                let user = service.login(&request).await?;
                println!("✅ Signed in as {}", user.display_name());
                Ok(())
            }
            AuthCommands::Signup {
                name,
                identifier: id,
                password,
            } => {
                let request = SignupRequest {
                    name,
                    identifier: identifier(id),
                    password: secret_or_prompt(password, "Choose a password: ")?,
                };
                let user = service.signup(&request).await?;
                println!("✅ Account created for {}", user.display_name());
                if !user.is_verified {
                    println!("Check your email or phone for a code, then run 'qick auth verify-otp'.");
                }
                Ok(())
            }
            AuthCommands::VerifyOtp { identifier: id, otp } => {
                let request = VerifyOtpRequest {
                    identifier: identifier(id),
                    otp,
                };
                let user = service.verify_otp(&request).await?;
                println!("✅ Verified and signed in as {}", user.display_name());
                Ok(())
            }
            AuthCommands::ResendOtp { identifier: id } => {
                let response = service.resend_otp(&identifier(id)).await?;
                print_message(response.message, "A new code is on its way");
                Ok(())
            }
            AuthCommands::ForgotPassword { identifier: id } => {
                let response = service.forgot_password(&identifier(id)).await?;
                print_message(response.message, "Password reset code sent");
                Ok(())
            }
            AuthCommands::ResetPassword {
                identifier: id,
                otp,
                new_password,
            } => {
                let request = ResetPasswordRequest {
                    identifier: identifier(id),
                    otp,
                    new_password: secret_or_prompt(new_password, "New password: ")?,
                };
                let response = service.reset_password(&request).await?;
                print_message(response.message, "Password updated");
                Ok(())
            }
            AuthCommands::Refresh => {
                service.refresh().await?;
                println!("✅ Session token refreshed");
                Ok(())
            }
            AuthCommands::Profile => {
                let user = service.get_profile().await?;
                print_profile(&user);
                Ok(())
            }
            AuthCommands::UpdateProfile {
                first_name,
                last_name,
                email,
                phone,
                avatar,
            } => {
                let patch = ProfilePatch {
                    first_name,
                    last_name,
                    email,
                    phone,
                    ..Default::default()
                };
                let user = match avatar {
                    Some(path) => {
                        debug!("Uploading avatar from {}", path.display());
                        service.update_avatar(&patch, read_avatar(&path)?).await?
                    }
                    None => service.update_profile(&patch).await?,
                };
                println!("✅ Profile updated");
                print_profile(&user);
                Ok(())
            }
            AuthCommands::Logout => {
                service.logout().await?;
                println!("✅ Signed out");
                Ok(())
            }
            AuthCommands::Status { json } => {
                let status = service.status();
                if json {
                    let value = json!({
                        "isAuthenticated": status.is_authenticated,
                        "phase": format!("{:?}", status.phase).to_lowercase(),
                        "user": status.display_name,
                        "hasRefreshToken": status.has_refresh_token,
                        "error": status.last_error,
                        "persistent": status.persistent,
                    });
                    println!("{}", to_pretty(&value)?);
                    return Ok(());
                }

                println!("Session Status:");
                println!("===============");
                if status.is_authenticated {
                    println!(
                        "✅ Signed in as {}",
                        status.display_name.unwrap_or_default()
                    );
                    println!(
                        "Refresh token: {}",
                        if status.has_refresh_token { "present" } else { "none" }
                    );
                } else {
                    println!("❌ Not signed in");
                }
                if let Some(error) = status.last_error {
                    println!("Last error: {}", error);
                }
                Ok(())
            }
        }
    }
}

fn to_pretty(value: &Value) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        AppError::Cli(CliError::InvalidArguments(format!(
            "Failed to format output: {}",
            e
        )))
    })
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        config: &mut Config,
        path: Option<PathBuf>,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                let location = match &path {
                    Some(p) => p.clone(),
                    None => Config::config_file_path()?,
                };

                println!("Current Configuration:");
                println!("=====================");
                println!("File: {}", location.display());
                println!("Base URL: {}", config.get_base_url());
                let prefix = config.get_api_prefix();
                println!(
                    "API prefix: {}",
                    if prefix.is_empty() { "(none)" } else { prefix.as_str() }
                );
                println!("Timeout: {}s", config.get_timeout_secs());
                println!(
                    "Storage: {}",
                    match config.get_storage() {
                        StorageBackend::File => "file",
                        StorageBackend::Keyring => "keyring",
                    }
                );
                if config.maps_api_key.is_some() {
                    println!("Maps API key: ✅ Set");
                } else {
                    println!("Maps API key: ❌ Not set");
                }
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                debug!("Setting config key {}", key);
                config.set_field(&key, &value)?;
                config.save(path)?;
                println!("✅ Set {}", key);
                println!("Configuration saved successfully.");
                Ok(())
            }
        }
    }
}

/// Replace token values with a fixed mask, at any depth.
fn mask_tokens(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if (key == "token" || key == "refreshToken") && v.is_string() {
                    *v = Value::String("********".to_string());
                } else {
                    mask_tokens(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_tokens),
        _ => {}
    }
}

#[derive(Default)]
pub struct StateHandler;

impl StateHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, command: StateCommands, store: &Store) -> Result<(), AppError> {
        match command {
            StateCommands::Show => {
                let mut snapshot = persist::snapshot(&store.state(), &PersistConfig::default());
                mask_tokens(&mut snapshot);
                println!("{}", to_pretty(&snapshot)?);
                Ok(())
            }
            StateCommands::Clear => {
                store.dispatch(SessionAction::Logout);
                store.purge()?;
                println!("✅ Local state cleared");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_tokens_hides_nested_tokens() {
        let mut value = json!({
            "_version": 1,
            "user": {"token": "t1", "refreshToken": "r1", "userData": {"id": "u1"}}
        });
        mask_tokens(&mut value);
        assert_eq!(value["user"]["token"], "********");
        assert_eq!(value["user"]["refreshToken"], "********");
        assert_eq!(value["user"]["userData"]["id"], "u1");
    }

    #[test]
    fn test_mask_tokens_leaves_null_tokens() {
        let mut value = json!({"user": {"token": null}});
        mask_tokens(&mut value);
        assert_eq!(value["user"]["token"], Value::Null);
    }

    #[test]
    fn test_mime_for_known_extensions() {
        assert_eq!(mime_for(Path::new("me.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("me")), "application/octet-stream");
    }
}
