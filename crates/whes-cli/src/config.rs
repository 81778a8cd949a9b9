//! CLI-owned configuration: TOML profiles, credential resolution, and
//! translation to `whes_core::MonitorConfig`.
//!
//! Core never sees these types -- it receives a pre-built `MonitorConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use whes_core::MonitorConfig;
use whes_core::config::{
    DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_SAMPLE_BY, DEFAULT_TIMEOUT,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration. Core never touches this type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name (used when --profile is not specified).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Named installation profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            profiles: HashMap::new(),
        }
    }
}

/// CLI-owned profile definition: one monitored installation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (defaults to the EU production endpoint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key identifying the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Signing secret (plaintext -- prefer `api_secret_env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    /// Environment variable name containing the signing secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret_env: Option<String>,

    /// Project the installation belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Device identifier of the battery system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Identifier of the grid meter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ammeter_id: Option<String>,

    /// Downsampling bucket for metrics queries (e.g. "10s").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_by: Option<String>,

    /// Seconds between poll cycles (minimum 15).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    /// Copy with secret material replaced for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        for profile in cfg.profiles.values_mut() {
            if profile.api_secret.is_some() {
                profile.api_secret = Some("<redacted>".into());
            }
        }
        cfg
    }
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "whes", "whes")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("whes");
    p
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("WHES_").only(&["default_profile"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `MonitorConfig` for the active profile.
///
/// This is the single boundary where CLI config types cross into core
/// types. An explicitly requested profile must exist; the implicit
/// default profile may be absent (credentials can then come entirely
/// from the environment).
pub fn resolve_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let available: Vec<_> = cfg.profiles.keys().cloned().collect();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    build_monitor_config(&profile, &profile_name, global)
}

/// Translate a CLI `Profile` + global flags into a `MonitorConfig`.
pub fn build_monitor_config(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<MonitorConfig, CliError> {
    // Base URL: flag / env > profile > built-in default.
    let base_url = non_empty(global.base_url.clone())
        .or_else(|| non_empty(profile.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

    // Credentials: process env > profile *_env indirection > profile literal.
    let api_key = resolve_credential(
        "WHES_API_KEY",
        profile.api_key_env.as_deref(),
        profile.api_key.as_deref(),
    )
    .ok_or_else(|| CliError::MissingField {
        field: "api_key".into(),
        profile: profile_name.into(),
    })?;
    let api_secret = resolve_credential(
        "WHES_API_SECRET",
        profile.api_secret_env.as_deref(),
        profile.api_secret.as_deref(),
    )
    .ok_or_else(|| CliError::MissingField {
        field: "api_secret".into(),
        profile: profile_name.into(),
    })?;

    let project_id = required(profile.project_id.as_deref(), "project_id", profile_name)?;
    let device_id = required(profile.device_id.as_deref(), "device_id", profile_name)?;
    let ammeter_id = required(profile.ammeter_id.as_deref(), "ammeter_id", profile_name)?;

    // Timeout: flag / env > profile > default.
    let timeout = global
        .timeout
        .or(profile.timeout)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

    let poll_interval = profile
        .poll_interval
        .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);

    Ok(MonitorConfig {
        base_url,
        api_key,
        api_secret: SecretString::from(api_secret),
        project_id,
        device_id,
        ammeter_id,
        sample_by: non_empty(profile.sample_by.clone())
            .unwrap_or_else(|| DEFAULT_SAMPLE_BY.to_owned()),
        poll_interval,
        timeout,
    })
}

// ── Credential helpers ───────────────────────────────────────────────

/// Resolve one credential through the override chain. Empty values count
/// as unset at every stage.
fn resolve_credential(
    env_key: &str,
    env_indirect: Option<&str>,
    literal: Option<&str>,
) -> Option<String> {
    if let Some(value) = non_empty(std::env::var(env_key).ok()) {
        return Some(value);
    }
    if let Some(name) = env_indirect {
        if let Some(value) = non_empty(std::env::var(name).ok()) {
            return Some(value);
        }
    }
    non_empty(literal.map(str::to_owned))
}

fn required(value: Option<&str>, field: &str, profile_name: &str) -> Result<String, CliError> {
    non_empty(value.map(str::to_owned)).ok_or_else(|| CliError::MissingField {
        field: field.into(),
        profile: profile_name.into(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
