//! Continuous watch handler.

use std::time::Duration;

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use whes_core::{CycleStatus, Monitor, MonitorConfig, Snapshot};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Start the monitor and print each published snapshot until Ctrl-C.
pub async fn handle(
    config: &MonitorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut config = config.clone();
    if let Some(secs) = args.interval {
        config.poll_interval = Duration::from_secs(secs);
    }

    let monitor = Monitor::new(&config)?;
    let color = output::should_color(global.color);

    // Subscribe before starting so the first published snapshot is seen.
    let mut snapshots = monitor.store().subscribe();
    let mut status = monitor.subscribe_status();

    monitor.start().await?;

    if !global.quiet {
        eprintln!(
            "Watching {}/{} every {}s. Ctrl-C to stop.",
            config.project_id,
            config.device_id,
            monitor.poll_interval().as_secs()
        );
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let at = monitor.store().last_refresh().unwrap_or_else(Utc::now);
                print_snapshot(at, &snapshot, global, color);
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                if let CycleStatus::Failed { message } = current {
                    print_failure(&message, &monitor, color);
                }
            }
        }
    }

    monitor.shutdown().await;
    if !global.quiet {
        eprintln!("Stopped.");
    }
    Ok(())
}

fn print_snapshot(at: DateTime<Utc>, snapshot: &Snapshot, global: &GlobalOpts, color: bool) {
    let stamp = format!("── {} ──", at.format("%Y-%m-%d %H:%M:%S UTC"));
    let heading = if color {
        stamp.dimmed().to_string()
    } else {
        stamp
    };
    let body = output::render_snapshot(global.output, snapshot, color);
    output::print_output(&format!("{heading}\n{body}"), global.quiet);
}

/// Failed cycles go to stderr even in quiet mode; the previous snapshot
/// stays current, so report how stale it is.
fn print_failure(message: &str, monitor: &Monitor, color: bool) {
    let age = monitor.store().data_age().map_or_else(
        || "no data yet".to_owned(),
        |age| format!("last good data {}s ago", age.num_seconds()),
    );
    if color {
        eprintln!("{} poll cycle failed: {message} ({age})", "✗".red());
    } else {
        eprintln!("✗ poll cycle failed: {message} ({age})");
    }
}
