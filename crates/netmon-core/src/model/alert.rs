// ── Alert records ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Alert severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Critical,
}

/// A persisted alert. Only `read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            id: format!("a-{}", Uuid::now_v7().simple()),
            kind,
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_type_field() {
        let alert = Alert::new(AlertKind::Critical, "over cap");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "critical");
        assert_eq!(json["read"], false);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn ids_are_unique() {
        let a = Alert::new(AlertKind::Warning, "x");
        let b = Alert::new(AlertKind::Warning, "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("warning".parse::<AlertKind>().unwrap(), AlertKind::Warning);
        assert_eq!(AlertKind::Critical.to_string(), "critical");
    }
}
