// ── History retention ──

use chrono::{DateTime, Duration, Utc};

use crate::model::HistoryEntry;

/// Keep entries no older than `max_days` relative to `now`, preserving order.
///
/// Entries stamped in the future (clock skew between runs) are kept.
pub fn retain_recent(
    entries: Vec<HistoryEntry>,
    now: DateTime<Utc>,
    max_days: u32,
) -> Vec<HistoryEntry> {
    let window = Duration::days(i64::from(max_days));
    entries
        .into_iter()
        .filter(|e| now.signed_duration_since(e.timestamp) <= window)
        .collect()
}
