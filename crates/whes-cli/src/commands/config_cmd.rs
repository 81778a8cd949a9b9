//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Starter config written by `whes config init`.
const STARTER_CONFIG: &str = r#"# whes configuration.
#
# Credentials and identifiers come from the WHES open API console.
# Prefer *_env indirection over plaintext secrets.

default_profile = "home"

[profiles.home]
# base_url = "https://open-api-eu.weiheng-tech.com/open-api"
api_key = ""
api_secret = ""
# api_secret_env = "WHES_HOME_SECRET"
project_id = ""
device_id = ""
ammeter_id = ""
# sample_by = "10s"
# poll_interval = 60
# timeout = 30
"#;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default().redacted();
            let rendered = match global.output {
                OutputFormat::Table => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::InvalidConfig {
                        message: format!("failed to serialize config: {e}"),
                    })?
                }
                OutputFormat::Json => output::render_json_pretty(&cfg),
                OutputFormat::Yaml => output::render_yaml(&cfg),
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists() {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, STARTER_CONFIG)?;

            eprintln!("✓ Wrote starter config to {}", path.display());
            eprintln!("  Fill in the credentials, then run: whes validate");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starter_config_parses_and_resolves() {
        let cfg: config::Config = toml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert!(cfg.profiles.contains_key("home"));
        // Placeholder credentials are empty strings, which count as unset.
        assert_eq!(cfg.profiles["home"].api_key.as_deref(), Some(""));
    }
}
