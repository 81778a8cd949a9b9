//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text and stable process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use whes_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 4;
    pub const DECODE: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the WHES cloud at {url}")]
    #[diagnostic(
        code(whes::connection),
        help(
            "Check network connectivity and the base URL.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(whes::connection),
        help("Increase --timeout (or the profile's `timeout`) or check connectivity.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("The cloud rejected the API credentials")]
    #[diagnostic(
        code(whes::auth),
        help(
            "Verify the API key and secret of the active profile (whes config\n\
             show). Both come from the WHES open API console."
        )
    )]
    InvalidCredentials,

    // ── Configuration ────────────────────────────────────────────────
    #[error("No {field} configured for profile '{profile}'")]
    #[diagnostic(
        code(whes::config),
        help(
            "Set `{field}` in the config file (whes config init) or export\n\
             the matching WHES_* environment variable."
        )
    )]
    MissingField { field: String, profile: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(whes::config),
        help(
            "Available profiles: {available}\n\
             Create one with: whes config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(whes::config),
        help("Inspect the resolved values with: whes config show")
    )]
    InvalidConfig { message: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(whes::config),
        help("Edit it in place, or remove it first to start over.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(whes::config))]
    ConfigFile(Box<figment::Error>),

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(whes::api))]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Could not decode the cloud response: {message}")]
    #[diagnostic(
        code(whes::decode),
        help("The endpoint answered with an unexpected payload. Re-check --base-url.")
    )]
    Decode { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::ConfigFile(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => exit_code::CONNECTION,
            Self::InvalidCredentials => exit_code::AUTH,
            Self::MissingField { .. }
            | Self::ProfileNotFound { .. }
            | Self::InvalidConfig { .. }
            | Self::ConfigExists { .. }
            | Self::ConfigFile(_) => exit_code::CONFIG,
            Self::Decode { .. } => exit_code::DECODE,
            Self::Api { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { .. } => Self::InvalidCredentials,

            CoreError::Timeout => Self::Timeout,

            CoreError::Api { message, status } => Self::Api { message, status },

            CoreError::Decode { message } => Self::Decode { message },

            CoreError::Config { message } => Self::InvalidConfig { message },

            CoreError::Internal(message) => Self::Api {
                message,
                status: None,
            },
        }
    }
}
