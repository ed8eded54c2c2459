// ── Usage aggregation ──
//
// Derived views over the history partition. Every call is a linear scan;
// retention keeps the partition small.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::model::{DailyUsage, HistoryEntry, RollingUsage, UsageTotals};
use crate::store::Store;

/// Read-only aggregation over stored history.
#[derive(Debug, Clone)]
pub struct UsageAggregator {
    store: Arc<Store>,
}

impl UsageAggregator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Total transfer for sessions recorded on `date` (local time).
    pub fn daily_usage(&self, date: NaiveDate) -> DailyUsage {
        daily_usage_of(&self.store.history(), date)
    }

    pub fn today(&self) -> DailyUsage {
        self.daily_usage(Local::now().date_naive())
    }

    /// The newest `limit` entries, newest first.
    pub fn recent_history(&self, limit: usize) -> Vec<HistoryEntry> {
        recent_of(&self.store.history(), limit)
    }

    /// Totals over the trailing `days` days, ending now.
    pub fn rolling_usage(&self, days: u32) -> RollingUsage {
        rolling_usage_of(&self.store.history(), Utc::now(), days)
    }
}

pub fn daily_usage_of(entries: &[HistoryEntry], date: NaiveDate) -> DailyUsage {
    let mut totals = UsageTotals::default();
    for entry in entries.iter().filter(|e| e.local_date() == date) {
        totals.add(entry);
    }
    DailyUsage { date, totals }
}

pub fn recent_of(entries: &[HistoryEntry], limit: usize) -> Vec<HistoryEntry> {
    entries.iter().rev().take(limit).cloned().collect()
}

pub fn rolling_usage_of(entries: &[HistoryEntry], now: DateTime<Utc>, days: u32) -> RollingUsage {
    let since = now - Duration::days(i64::from(days));
    let mut totals = UsageTotals::default();
    let mut sessions = 0;
    for entry in entries.iter().filter(|e| e.timestamp >= since) {
        totals.add(entry);
        sessions += 1;
    }
    RollingUsage {
        days,
        sessions,
        totals,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Counters;
    use crate::store::retain_recent;

    fn local_noon(date: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(ts: DateTime<Utc>, bytes_in: u64, bytes_out: u64) -> HistoryEntry {
        HistoryEntry::at(ts, Counters::new(bytes_in, bytes_out), 30)
    }

    #[test]
    fn daily_usage_sums_only_matching_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let before = day.pred_opt().unwrap();
        let after = day.succ_opt().unwrap();
        let entries = vec![
            entry(local_noon(before), 1_000, 1_000),
            entry(local_noon(day), 100, 10),
            entry(local_noon(day) + Duration::hours(3), 200, 20),
            entry(local_noon(after), 5_000, 5_000),
        ];

        let usage = daily_usage_of(&entries, day);
        assert_eq!(usage.date, day);
        assert_eq!(usage.totals, UsageTotals {
            bytes_in: 300,
            bytes_out: 30,
        });
    }

    #[test]
    fn daily_usage_of_empty_day_is_zero() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let usage = daily_usage_of(&[], day);
        assert_eq!(usage.totals.total(), 0);
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let now = Utc::now();
        let entries: Vec<HistoryEntry> = (0..5)
            .map(|i| entry(now - Duration::minutes(10 - i), u64::try_from(i).unwrap(), 0))
            .collect();

        let recent = recent_of(&entries, 3);
        let ins: Vec<u64> = recent.iter().map(|e| e.bytes_in).collect();
        assert_eq!(ins, vec![4, 3, 2]);
        // Source order untouched.
        assert_eq!(entries[0].bytes_in, 0);
    }

    #[test]
    fn recent_with_large_limit_returns_all() {
        let now = Utc::now();
        let entries = vec![entry(now, 1, 1), entry(now, 2, 2)];
        assert_eq!(recent_of(&entries, 50).len(), 2);
    }

    #[test]
    fn rolling_window_excludes_older_sessions() {
        let now = Utc::now();
        let entries = vec![
            entry(now - Duration::days(8), 1_000, 0),
            entry(now - Duration::days(6), 10, 1),
            entry(now - Duration::hours(1), 20, 2),
        ];

        let usage = rolling_usage_of(&entries, now, 7);
        assert_eq!(usage.sessions, 2);
        assert_eq!(usage.totals, UsageTotals {
            bytes_in: 30,
            bytes_out: 3,
        });
    }

    #[test]
    fn rolling_window_matches_retention_boundary() {
        let now = Utc::now();
        let entries = vec![
            entry(now - Duration::days(7) - Duration::seconds(1), 1_000, 0),
            entry(now - Duration::days(7), 10, 1),
        ];

        // Retention keeps the boundary entry, so the total counts it too.
        assert_eq!(retain_recent(entries.clone(), now, 7).len(), 1);
        let usage = rolling_usage_of(&entries, now, 7);
        assert_eq!(usage.sessions, 1);
        assert_eq!(usage.totals.bytes_in, 10);
    }
}
