//! Command dispatch: bridges CLI args -> core Monitor -> output formatting.

pub mod config_cmd;
pub mod fetch;
pub mod validate;
pub mod watch;

use whes_core::MonitorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a monitor-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: &MonitorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Validate => validate::handle(config, global).await,
        Command::Fetch => fetch::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
