//! One-shot fetch handler.

use whes_core::{Monitor, MonitorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Run a single poll cycle and print the resulting snapshot.
pub async fn handle(config: &MonitorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = Monitor::new(config)?;
    monitor.poll_once().await?;

    let snapshot = monitor.store().current();
    let rendered = output::render_snapshot(
        global.output,
        &snapshot,
        output::should_color(global.color),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
