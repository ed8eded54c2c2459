// ── Threshold alerts ──

use std::sync::Arc;

use tracing::info;

use crate::error::CoreError;
use crate::model::{Alert, AlertKind, AlertThresholds};
use crate::store::Store;

/// Compare `usage` against `capacity` and pick the alert level, if any.
///
/// A zero capacity never alerts.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn classify(usage: u64, capacity: u64, thresholds: AlertThresholds) -> Option<AlertKind> {
    if capacity == 0 {
        return None;
    }
    let pct = usage as f64 / capacity as f64 * 100.0;
    if pct >= f64::from(thresholds.critical_pct) {
        Some(AlertKind::Critical)
    } else if pct >= f64::from(thresholds.warning_pct) {
        Some(AlertKind::Warning)
    } else {
        None
    }
}

/// Raises alerts and manages the alerts partition.
///
/// Every qualifying evaluation yields a new record; repeated conditions
/// are not collapsed.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    store: Arc<Store>,
}

impl AlertEvaluator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Classify and, when a threshold is crossed, persist a new alert.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn evaluate(
        &self,
        usage: u64,
        capacity: u64,
        thresholds: AlertThresholds,
    ) -> Result<Option<Alert>, CoreError> {
        let Some(kind) = classify(usage, capacity, thresholds) else {
            return Ok(None);
        };
        let pct = usage as f64 / capacity as f64 * 100.0;
        let limit = match kind {
            AlertKind::Critical => thresholds.critical_pct,
            AlertKind::Warning => thresholds.warning_pct,
        };
        let message = format!(
            "Data usage at {pct:.1}% of daily cap ({usage} of {capacity} bytes, {kind} threshold {limit}%)"
        );
        let alert = self.store.add_alert(kind, &message)?;
        info!(id = %alert.id, %kind, pct, "alert raised");
        Ok(Some(alert))
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.store.alerts()
    }

    pub fn unread(&self) -> Vec<Alert> {
        self.store.alerts().into_iter().filter(|a| !a.read).collect()
    }

    /// Mark one alert read. `Ok(false)` if no alert has that id.
    pub fn mark_read(&self, id: &str) -> Result<bool, CoreError> {
        self.store.mark_alert_read(id)
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.clear_alerts()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const THRESHOLDS: AlertThresholds = AlertThresholds {
        warning_pct: 80,
        critical_pct: 95,
    };

    fn evaluator() -> (TempDir, AlertEvaluator) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        (dir, AlertEvaluator::new(store))
    }

    #[test]
    fn classify_levels() {
        assert_eq!(classify(90, 100, THRESHOLDS), Some(AlertKind::Warning));
        assert_eq!(classify(96, 100, THRESHOLDS), Some(AlertKind::Critical));
        assert_eq!(classify(50, 100, THRESHOLDS), None);
    }

    #[test]
    fn classify_boundaries_are_inclusive() {
        assert_eq!(classify(80, 100, THRESHOLDS), Some(AlertKind::Warning));
        assert_eq!(classify(95, 100, THRESHOLDS), Some(AlertKind::Critical));
        assert_eq!(classify(79, 100, THRESHOLDS), None);
    }

    #[test]
    fn zero_capacity_never_alerts() {
        assert_eq!(classify(1_000, 0, THRESHOLDS), None);
    }

    #[test]
    fn warning_emits_exactly_one_record() {
        let (_dir, ev) = evaluator();
        let alert = ev.evaluate(90, 100, THRESHOLDS).unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert!(!alert.read);
        assert_eq!(ev.alerts(), vec![alert]);
    }

    #[test]
    fn critical_emits_exactly_one_record() {
        let (_dir, ev) = evaluator();
        ev.evaluate(96, 100, THRESHOLDS).unwrap();
        let alerts = ev.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Critical);
    }

    #[test]
    fn below_threshold_emits_nothing() {
        let (_dir, ev) = evaluator();
        assert!(ev.evaluate(50, 100, THRESHOLDS).unwrap().is_none());
        assert!(ev.alerts().is_empty());
    }

    #[test]
    fn repeated_conditions_are_not_collapsed() {
        let (_dir, ev) = evaluator();
        ev.evaluate(90, 100, THRESHOLDS).unwrap();
        ev.evaluate(90, 100, THRESHOLDS).unwrap();
        assert_eq!(ev.alerts().len(), 2);
    }

    #[test]
    fn mark_read_then_unread_filter() {
        let (_dir, ev) = evaluator();
        let a = ev.evaluate(90, 100, THRESHOLDS).unwrap().unwrap();
        ev.evaluate(99, 100, THRESHOLDS).unwrap();

        assert!(ev.mark_read(&a.id).unwrap());
        let unread = ev.unread();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].kind, AlertKind::Critical);
    }

    #[test]
    fn clear_removes_everything() {
        let (_dir, ev) = evaluator();
        ev.evaluate(96, 100, THRESHOLDS).unwrap();
        ev.clear().unwrap();
        assert!(ev.alerts().is_empty());
    }
}
