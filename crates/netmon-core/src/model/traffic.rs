// ── Live traffic types ──

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Cumulative byte counters reported by a [`DataSource`](crate::DataSource).
///
/// Monotonic non-decreasing for the lifetime of the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl Counters {
    pub fn new(bytes_in: u64, bytes_out: u64) -> Self {
        Self {
            bytes_in,
            bytes_out,
        }
    }

    /// Per-direction difference `self - earlier`, clamped at zero.
    ///
    /// A source that resets (interface went away, counter wrap) produces
    /// a zero delta rather than an underflow.
    pub fn since(&self, earlier: &Counters) -> Counters {
        Counters {
            bytes_in: self.bytes_in.saturating_sub(earlier.bytes_in),
            bytes_out: self.bytes_out.saturating_sub(earlier.bytes_out),
        }
    }

    pub fn total(&self) -> u64 {
        self.bytes_in.saturating_add(self.bytes_out)
    }
}

/// A point-in-time counter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub counters: Counters,
    pub taken_at: Instant,
}

impl Sample {
    pub fn new(counters: Counters, taken_at: Instant) -> Self {
        Self { counters, taken_at }
    }

    pub fn now(counters: Counters) -> Self {
        Self::new(counters, Instant::now())
    }
}

/// Throughput in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub speed_in: f64,
    pub speed_out: f64,
}

/// Derive the rate between two successive samples.
///
/// Returns `None` when no time has passed between them (or the clock went
/// backwards), in which case the caller keeps its previous speed.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn compute_rate(previous: &Sample, next: &Sample) -> Option<Rate> {
    let elapsed = next
        .taken_at
        .checked_duration_since(previous.taken_at)?
        .as_secs_f64();
    if elapsed <= 0.0 {
        return None;
    }
    let delta = next.counters.since(&previous.counters);
    Some(Rate {
        speed_in: delta.bytes_in as f64 / elapsed,
        speed_out: delta.bytes_out as f64 / elapsed,
    })
}

/// One socket as reported by the data source. Replaced wholesale each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub protocol: String,
    pub local_port: u16,
    pub remote_host: String,
    pub remote_port: u16,
    pub state: String,
    pub owner_app: Option<String>,
}

/// Live statistics for the active (or most recent) session.
///
/// `bytes_in` / `bytes_out` count bytes since the session started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStats {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub speed_in: f64,
    pub speed_out: f64,
    pub connections: Vec<ConnectionInfo>,
}

impl CurrentStats {
    pub fn apply_rate(&mut self, rate: Rate) {
        self.speed_in = rate.speed_in;
        self.speed_out = rate.speed_out;
    }
}
