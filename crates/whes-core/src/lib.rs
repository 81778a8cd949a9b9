// whes-core: Polling, normalization and domain model between whes-api
// and consumers (CLI).

pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod normalize;
pub mod points;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::MonitorConfig;
pub use error::CoreError;
pub use model::{MetricRow, MetricValue, Section, Snapshot};
pub use monitor::{CycleStatus, Monitor};
pub use points::{MeasurementPoint, PointKind, Unit};
pub use store::SnapshotStore;

// Re-export the probe outcome so frontends need no direct whes-api dep.
pub use whes_api::CredentialCheck;
