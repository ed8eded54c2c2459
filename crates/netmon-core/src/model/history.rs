// ── Usage history types ──

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::traffic::Counters;

/// Summary of one completed monitoring session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub duration_seconds: u32,
}

impl HistoryEntry {
    /// Build a new entry stamped with the current time and a fresh id.
    pub fn record(transferred: Counters, duration_seconds: u32) -> Self {
        Self::at(Utc::now(), transferred, duration_seconds)
    }

    pub fn at(timestamp: DateTime<Utc>, transferred: Counters, duration_seconds: u32) -> Self {
        Self {
            id: format!("h-{}", Uuid::now_v7().simple()),
            timestamp,
            bytes_in: transferred.bytes_in,
            bytes_out: transferred.bytes_out,
            duration_seconds,
        }
    }

    /// Calendar day of the entry in the local timezone.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

/// Summed transfer over some set of history entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl UsageTotals {
    pub fn add(&mut self, entry: &HistoryEntry) {
        self.bytes_in = self.bytes_in.saturating_add(entry.bytes_in);
        self.bytes_out = self.bytes_out.saturating_add(entry.bytes_out);
    }

    pub fn total(&self) -> u64 {
        self.bytes_in.saturating_add(self.bytes_out)
    }
}

/// Usage for one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: UsageTotals,
}

/// Usage over a trailing window of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingUsage {
    pub days: u32,
    pub sessions: usize,
    #[serde(flatten)]
    pub totals: UsageTotals,
}
