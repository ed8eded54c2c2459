// ── Core error types ──
//
// Errors surfaced by netmon-core. Read-side storage problems never appear
// here: a missing or corrupt partition is replaced by its default.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::Partition;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ──────────────────────────────────────────────────────
    #[error("Cannot initialize data directory {path}: {source}")]
    StorageInit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist {partition} to {path}: {source}")]
    StorageWrite {
        partition: Partition,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {partition}: {source}")]
    Encode {
        partition: Partition,
        #[source]
        source: serde_json::Error,
    },

    // ── Settings ─────────────────────────────────────────────────────
    #[error("Invalid setting {field}: {reason}")]
    InvalidSettings { field: String, reason: String },

    // ── Data source ──────────────────────────────────────────────────
    #[error("Traffic source unavailable: {message}")]
    Source { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the error came from a failed write to the data directory.
    pub fn is_storage_write(&self) -> bool {
        matches!(self, Self::StorageWrite { .. } | Self::Encode { .. })
    }
}
