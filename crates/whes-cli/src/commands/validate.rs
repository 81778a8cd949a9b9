//! Credential validation handler.

use owo_colors::OwoColorize;

use whes_core::{CredentialCheck, Monitor, MonitorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Probe the cloud with a minimal signed request and report the outcome.
pub async fn handle(config: &MonitorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = Monitor::new(config)?;

    match monitor.validate_credentials().await {
        CredentialCheck::Valid => {
            let line = if output::should_color(global.color) {
                format!("{} credentials accepted by {}", "✓".green(), config.base_url)
            } else {
                format!("✓ credentials accepted by {}", config.base_url)
            };
            output::print_output(&line, global.quiet);
            Ok(())
        }
        CredentialCheck::InvalidCredentials => Err(CliError::InvalidCredentials),
        CredentialCheck::CannotConnect { reason } => Err(CliError::ConnectionFailed {
            url: config.base_url.clone(),
            reason,
        }),
    }
}
