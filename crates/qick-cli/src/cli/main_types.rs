use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qick")]
#[command(about = "Command line client for the Qick sports-booking backend")]
#[command(version)]
#[command(after_help = "Examples:
  qick auth login --email ana@example.com   # Sign in (password is prompted)
  qick auth status                          # Show the saved session
  qick auth profile                         # Fetch the signed-in profile
  qick auth logout                          # Sign out and reset local state
  qick config set base_url http://localhost:4000
  qick state show                           # Print the persisted snapshot

Environment Variables:
  QICK_BASE_URL   Backend server URL
  QICK_PASSWORD   Password for login/signup (skips the prompt)
  RUST_LOG        Log filter, overrides --verbose")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// Backend server URL
    #[arg(long, global = true, env = "QICK_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign up and manage the current session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Inspect or discard the persisted state snapshot
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

/// Email or phone; exactly one is expected.
#[derive(Args, Debug, Clone)]
pub struct IdentifierArgs {
    /// Account email address
    #[arg(long)]
    pub email: Option<String>,
    /// Account phone number
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with email or phone and password
    #[command(after_help = "Examples:
  qick auth login --email ana@example.com
  qick auth login --phone +34600123456")]
    Login {
        #[command(flatten)]
        identifier: IdentifierArgs,
        /// Password (prompted when omitted)
        #[arg(long, env = "QICK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        /// Full name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        identifier: IdentifierArgs,
        /// Password, at least 6 characters (prompted when omitted)
        #[arg(long, env = "QICK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Confirm an account with the one-time code
    VerifyOtp {
        #[command(flatten)]
        identifier: IdentifierArgs,
        /// Code received by email or SMS
        #[arg(long)]
        otp: String,
    },
    /// Send a new one-time code
    ResendOtp {
        #[command(flatten)]
        identifier: IdentifierArgs,
    },
    /// Request a password reset code
    ForgotPassword {
        #[command(flatten)]
        identifier: IdentifierArgs,
    },
    /// Set a new password using a reset code
    ResetPassword {
        #[command(flatten)]
        identifier: IdentifierArgs,
        #[arg(long)]
        otp: String,
        /// New password (prompted when omitted)
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Exchange the refresh token for a new token pair
    Refresh,
    /// Fetch the signed-in profile from the server
    Profile,
    /// Change profile fields, optionally uploading an avatar image
    #[command(after_help = "Examples:
  qick auth update-profile --last-name Ruiz
  qick auth update-profile --avatar ./me.png")]
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Image file sent as a multipart upload
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Sign out and reset all local state
    Logout,
    /// Show the local session
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set one configuration value
    #[command(after_help = "Keys:
  base_url       Backend server URL (http:// or https://)
  api_prefix     Path inserted before every endpoint, e.g. /api/v1
  timeout_secs   Request timeout in seconds
  storage        Where the session is kept: file or keyring
  maps_api_key   Key for the places provider")]
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print the persisted snapshot with tokens masked
    Show,
    /// Sign out locally and delete the persisted snapshot
    Clear,
}
