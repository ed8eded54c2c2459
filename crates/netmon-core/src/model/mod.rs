// ── Domain model ──

pub mod alert;
pub mod history;
pub mod settings;
pub mod traffic;

pub use alert::{Alert, AlertKind};
pub use history::{DailyUsage, HistoryEntry, RollingUsage, UsageTotals};
pub use settings::{AlertThresholds, Settings, SettingsPatch};
pub use traffic::{ConnectionInfo, Counters, CurrentStats, Rate, Sample, compute_rate};
