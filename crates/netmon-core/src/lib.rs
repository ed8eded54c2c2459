//! Traffic sampling, usage history and threshold alerts for `netmon`.
//!
//! This crate owns the monitoring state machine and everything it persists:
//!
//! - **[`SamplingEngine`]**: Idle/Running state machine. [`start()`](SamplingEngine::start)
//!   spawns a session driver that ticks at the configured refresh interval,
//!   differences successive counter readings into rates, and stops itself
//!   when its time budget runs out. [`stop()`](SamplingEngine::stop) writes
//!   exactly one [`HistoryEntry`] per session.
//!
//! - **[`Store`]**: Three JSON partitions (history, settings, alerts) in one
//!   data directory. Reads fall back to defaults; writes are atomic
//!   per file and report failures.
//!
//! - **[`UsageAggregator`]**: Daily and rolling totals, newest-first history.
//!
//! - **[`AlertEvaluator`]**: Percentage-of-cap alerts.
//!
//! - **[`DataSource`]**: Where counters come from: [`SystemSource`] reads
//!   the host's interfaces, [`ScriptedSource`] replays a fixed sequence.

pub mod aggregate;
pub mod alerts;
pub mod engine;
pub mod error;
pub mod model;
pub mod source;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::UsageAggregator;
pub use alerts::AlertEvaluator;
pub use engine::{
    DEFAULT_SESSION_BUDGET, MonitorState, SamplingEngine, SessionEnd, SessionSummary,
    StartOutcome, StatusReport,
};
pub use error::CoreError;
pub use source::{DataSource, ScriptedSource, SystemSource};
pub use store::{Partition, Store};

pub use model::{
    Alert, AlertKind, AlertThresholds, ConnectionInfo, Counters, CurrentStats, DailyUsage,
    HistoryEntry, Rate, RollingUsage, Sample, Settings, SettingsPatch, UsageTotals,
};
