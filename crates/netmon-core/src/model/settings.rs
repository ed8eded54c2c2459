// ── Runtime settings ──

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_REFRESH_INTERVAL_MS: u32 = 2_000;
pub const DEFAULT_MAX_HISTORY_DAYS: u32 = 30;

/// Percentages of the daily cap at which alerts are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    pub warning_pct: u8,
    pub critical_pct: u8,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning_pct: 80,
            critical_pct: 95,
        }
    }
}

/// The singleton settings record stored in the `settings` partition.
///
/// Keys this version does not know about are carried in `extra` so a
/// rewrite never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub refresh_interval_ms: u32,
    pub max_history_days: u32,
    pub alert_thresholds: AlertThresholds,
    /// Daily transfer allowance (in + out). Alerts are only evaluated when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_cap_bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            max_history_days: DEFAULT_MAX_HISTORY_DAYS,
            alert_thresholds: AlertThresholds::default(),
            daily_cap_bytes: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.refresh_interval_ms.max(1)))
    }

    /// Shallow merge: every `Some` field of the patch replaces the stored
    /// value, nested records included as a whole.
    pub fn merged(&self, patch: &SettingsPatch) -> Settings {
        let mut next = self.clone();
        if let Some(ms) = patch.refresh_interval_ms {
            next.refresh_interval_ms = ms;
        }
        if let Some(days) = patch.max_history_days {
            next.max_history_days = days;
        }
        if let Some(thresholds) = patch.alert_thresholds {
            next.alert_thresholds = thresholds;
        }
        if let Some(cap) = patch.daily_cap_bytes {
            // Zero clears the cap.
            next.daily_cap_bytes = (cap > 0).then_some(cap);
        }
        next
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.refresh_interval_ms == 0 {
            return Err(CoreError::InvalidSettings {
                field: "refreshIntervalMs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_history_days == 0 {
            return Err(CoreError::InvalidSettings {
                field: "maxHistoryDays".into(),
                reason: "must be at least one day".into(),
            });
        }
        let t = self.alert_thresholds;
        if t.critical_pct > 100 {
            return Err(CoreError::InvalidSettings {
                field: "alertThresholds.criticalPct".into(),
                reason: format!("{} exceeds 100", t.critical_pct),
            });
        }
        if t.warning_pct > t.critical_pct {
            return Err(CoreError::InvalidSettings {
                field: "alertThresholds.warningPct".into(),
                reason: format!(
                    "{} is above the critical threshold {}",
                    t.warning_pct, t.critical_pct
                ),
            });
        }
        Ok(())
    }
}

/// A partial settings update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub refresh_interval_ms: Option<u32>,
    pub max_history_days: Option<u32>,
    pub alert_thresholds: Option<AlertThresholds>,
    pub daily_cap_bytes: Option<u64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
