//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use bluelink_config::ConfigError;
use bluelink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DISCOVERY: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Blue Link gateway at {url}")]
    #[diagnostic(
        code(bluelink::connection_failed),
        help(
            "Check your network connection and the gateway URL.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway returned HTTP {status}")]
    #[diagnostic(
        code(bluelink::transport),
        help("The gateway answered: {message}\nTry again later; nothing was retried.")
    )]
    Transport { status: u16, message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(bluelink::timeout),
        help("Increase the timeout with --timeout, or try again when the vehicle has signal.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(bluelink::auth_failed),
        help(
            "Verify your username and password.\n\
             Run: bluelink config set-secret password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}' (missing {missing})")]
    #[diagnostic(
        code(bluelink::no_credentials),
        help(
            "Configure credentials with: bluelink config init\n\
             Or set BLUELINK_USERNAME, BLUELINK_PASSWORD, BLUELINK_PIN and BLUELINK_VIN."
        )
    )]
    NoCredentials { profile: String, missing: String },

    #[error("Not logged in")]
    #[diagnostic(code(bluelink::not_authenticated))]
    NotAuthenticated,

    // ── Vehicle ──────────────────────────────────────────────────────
    #[error("Vehicle discovery failed: {message}")]
    #[diagnostic(
        code(bluelink::discovery_failed),
        help("Make sure the vehicle is enrolled in Blue Link for this account.")
    )]
    DiscoveryFailed { message: String },

    #[error("Vehicle rejected {command}: {message}")]
    #[diagnostic(code(bluelink::command_rejected))]
    CommandRejected { command: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bluelink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bluelink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bluelink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(bluelink::config))]
    Config { message: String },

    #[error(transparent)]
    #[diagnostic(code(bluelink::config))]
    Figment(Box<figment::Error>),

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(bluelink::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Transport { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::NotAuthenticated => {
                exit_code::AUTH
            }
            Self::DiscoveryFailed { .. } => exit_code::DISCOVERY,
            Self::CommandRejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. }
            | Self::Config { .. }
            | Self::Figment(_)
            | Self::Io(_)
            | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::NotAuthenticated => CliError::NotAuthenticated,
            CoreError::DiscoveryFailed { message } => CliError::DiscoveryFailed { message },
            CoreError::Transport { status, message } => CliError::Transport { status, message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            CoreError::CommandFailed { service, message } => CliError::CommandRejected {
                command: service,
                message,
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, missing } => {
                CliError::NoCredentials { profile, missing }
            }
            ConfigError::Figment(e) => CliError::Figment(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Config {
                message: format!("failed to serialize config: {e}"),
            },
        }
    }
}
