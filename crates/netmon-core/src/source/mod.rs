// ── Traffic data sources ──
//
// The engine only differences successive counter readings; where those
// readings come from is pluggable.

mod procnet;
mod scripted;
mod system;

pub use procnet::parse_proc_net;
pub use scripted::ScriptedSource;
pub use system::SystemSource;

use crate::error::CoreError;
use crate::model::{ConnectionInfo, Counters};

/// Supplier of cumulative byte counters and connection snapshots.
pub trait DataSource: Send + Sync {
    /// Current cumulative counters. Must never decrease while the source lives.
    fn sample_counters(&self) -> Result<Counters, CoreError>;

    /// Snapshot of open connections.
    fn list_connections(&self) -> Vec<ConnectionInfo>;
}
