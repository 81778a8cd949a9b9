// ── Monitor ──
//
// Lifecycle management for polling one installation: an immediate
// startup cycle, a background interval task, and last-known-good
// snapshot publication through the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use whes_api::wire::MetricsRequest;
use whes_api::{CredentialCheck, TransportConfig, WhesClient};

use crate::config::{MIN_POLL_INTERVAL, MonitorConfig, WINDOW_OVERLAP};
use crate::error::CoreError;
use crate::model::{Section, Snapshot};
use crate::normalize::{flip_power_signs, normalize};
use crate::points;
use crate::store::SnapshotStore;

// ── CycleStatus ──────────────────────────────────────────────────

/// Outcome of the most recent poll cycle, observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    /// No cycle has completed yet.
    Idle,
    /// The last cycle succeeded at the given instant.
    Ok { at: DateTime<Utc> },
    /// The last cycle failed; the previous snapshot is still served.
    Failed { message: String },
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`; all clones share the
/// snapshot store and the background poll task.
#[derive(Clone, Debug)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

#[derive(Debug)]
struct MonitorInner {
    client: WhesClient,
    sample_by: String,
    poll_interval: Duration,
    store: SnapshotStore,
    cycle_status: watch::Sender<CycleStatus>,
    cancel: CancellationToken,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    /// Build a monitor from configuration. Validates the base URL and
    /// constructs the HTTP client; no request is issued until
    /// [`poll_once()`](Self::poll_once) or [`start()`](Self::start).
    pub fn new(config: &MonitorConfig) -> Result<Self, CoreError> {
        let client = WhesClient::new(
            &config.base_url,
            config.api_credentials(),
            config.installation(),
            &TransportConfig {
                timeout: config.timeout,
            },
        )?;

        let poll_interval = config.effective_poll_interval();
        if poll_interval != config.poll_interval {
            warn!(
                requested_secs = config.poll_interval.as_secs(),
                floor_secs = MIN_POLL_INTERVAL.as_secs(),
                "poll interval below floor, clamped"
            );
        }

        let (cycle_status, _) = watch::channel(CycleStatus::Idle);

        Ok(Self {
            inner: Arc::new(MonitorInner {
                client,
                sample_by: config.sample_by.clone(),
                poll_interval,
                store: SnapshotStore::new(),
                cycle_status,
                cancel: CancellationToken::new(),
                poll_task: Mutex::new(None),
            }),
        })
    }

    /// Access the snapshot store.
    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    /// Poll interval actually in effect (after clamping).
    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Outcome of the most recent cycle.
    pub fn cycle_status(&self) -> CycleStatus {
        self.inner.cycle_status.borrow().clone()
    }

    /// Subscribe to cycle outcomes.
    pub fn subscribe_status(&self) -> watch::Receiver<CycleStatus> {
        self.inner.cycle_status.subscribe()
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll cycle: fetch both series concurrently, normalize,
    /// and publish a snapshot. On failure, the store is left untouched
    /// and the error propagates.
    pub async fn poll_once(&self) -> Result<(), CoreError> {
        match self.poll_cycle().await {
            Ok(snapshot) => {
                debug!(
                    ems_values = snapshot.ems.len(),
                    ammeter_values = snapshot.ammeter.len(),
                    "snapshot published"
                );
                self.inner.store.publish(snapshot);
                self.inner
                    .cycle_status
                    .send_modify(|status| *status = CycleStatus::Ok { at: Utc::now() });
                Ok(())
            }
            Err(e) => {
                self.inner.cycle_status.send_modify(|status| {
                    *status = CycleStatus::Failed {
                        message: e.to_string(),
                    };
                });
                Err(e)
            }
        }
    }

    async fn poll_cycle(&self) -> Result<Snapshot, CoreError> {
        let (start, end) = self.poll_window();
        debug!(start, end, "poll cycle");

        let ems_request = self.metrics_request(Section::Ems, start, end);
        let ammeter_request = self.metrics_request(Section::Ammeter, start, end);

        let (ems_response, ammeter_response) = tokio::try_join!(
            self.inner.client.ems_metrics(&ems_request),
            self.inner.client.ammeter_metrics(&ammeter_request),
        )?;

        // Keep the newest row of each series; older rows in the window
        // are superseded.
        let ems = normalize(ems_response).pop().unwrap_or_default();
        let mut ammeter = normalize(ammeter_response).pop().unwrap_or_default();
        flip_power_signs(&mut ammeter);

        Ok(Snapshot { ems, ammeter })
    }

    /// Query window in epoch milliseconds: one interval plus the fixed
    /// overlap, ending now. The overlap absorbs cloud ingest lag.
    fn poll_window(&self) -> (i64, i64) {
        let end = Utc::now().timestamp_millis();
        let span = self.inner.poll_interval + WINDOW_OVERLAP;
        let span_ms = i64::try_from(span.as_millis()).unwrap_or(i64::MAX);
        (end.saturating_sub(span_ms), end)
    }

    fn metrics_request(&self, section: Section, start: i64, end: i64) -> MetricsRequest {
        MetricsRequest {
            start,
            end,
            sample_by: self.inner.sample_by.clone(),
            columns: points::columns(section),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first cycle, then spawn the periodic poll task.
    ///
    /// The first cycle's error propagates so startup fails fast on bad
    /// credentials or an unreachable endpoint.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.poll_once().await?;

        let mut task = self.inner.poll_task.lock().await;
        if task.is_none() {
            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            *task = Some(tokio::spawn(poll_task(monitor, cancel)));
            info!(
                interval_secs = self.inner.poll_interval.as_secs(),
                "monitor started"
            );
        }
        Ok(())
    }

    /// Stop the poll task. Idempotent; the store keeps its last
    /// snapshot so readers can still drain it after shutdown.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(task) = self.inner.poll_task.lock().await.take() {
            let _ = task.await;
        }
        debug!("monitor stopped");
    }

    // ── Credential probe ─────────────────────────────────────────

    /// Probe the API with the configured credentials without touching
    /// the store.
    pub async fn validate_credentials(&self) -> CredentialCheck {
        self.inner
            .client
            .validate_credentials(&self.inner.sample_by)
            .await
    }
}

// ── Background task ──────────────────────────────────────────────

/// Run poll cycles on the interval until cancelled. Each cycle is
/// awaited inside the tick arm, so cycles never overlap and a slow
/// cycle delays the next tick instead of stacking.
async fn poll_task(monitor: Monitor, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = monitor.poll_once().await {
                    warn!(error = %e, "poll cycle failed");
                }
            }
        }
    }
}
