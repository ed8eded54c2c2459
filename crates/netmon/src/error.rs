//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netmon_config::ConfigError;
use netmon_core::CoreError;

/// Process exit codes. Argument errors exit with 2 from clap itself.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Storage ──────────────────────────────────────────────────────
    #[error("Cannot use data directory {path}")]
    #[diagnostic(
        code(netmon::data_dir),
        help(
            "Check that the directory exists or can be created and is writable.\n\
             Choose another location with --data-dir or NETMON_DATA_DIR."
        )
    )]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not save {what} to {path}")]
    #[diagnostic(
        code(netmon::storage_write),
        help("The change was not applied. Check free space and permissions on the data directory.")
    )]
    StorageWrite {
        what: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netmon::not_found),
        help("Run: netmon {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netmon::validation))]
    Validation { field: String, reason: String },

    // ── Traffic source ───────────────────────────────────────────────
    #[error("Cannot read traffic counters: {message}")]
    #[diagnostic(
        code(netmon::source),
        help("Interface statistics may be unavailable on this platform or in this sandbox.")
    )]
    Source { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration")]
    #[diagnostic(code(netmon::config), help("Check the config file at {path}"))]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    // ── Internal / Serialization ─────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(netmon::internal))]
    Internal(String),

    #[error("Could not render JSON output: {0}")]
    #[diagnostic(code(netmon::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML output: {0}")]
    #[diagnostic(code(netmon::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StorageInit { path, source } => CliError::DataDir {
                path: path.display().to_string(),
                source,
            },

            CoreError::StorageWrite {
                partition,
                path,
                source,
            } => CliError::StorageWrite {
                what: partition.to_string(),
                path: path.display().to_string(),
                source,
            },

            CoreError::Encode { partition, source } => {
                CliError::Internal(format!("failed to encode {partition}: {source}"))
            }

            CoreError::InvalidSettings { field, reason } => CliError::Validation { field, reason },

            CoreError::Source { message } => CliError::Source { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config {
            path: netmon_config::config_path().display().to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use netmon_core::Partition;

    use super::*;

    #[test]
    fn write_failures_name_the_partition() {
        let err = CliError::from(CoreError::StorageWrite {
            partition: Partition::Alerts,
            path: PathBuf::from("/data/alerts.json"),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.to_string(), "Could not save alerts to /data/alerts.json");
    }

    #[test]
    fn source_failures_keep_their_message() {
        let err = CliError::from(CoreError::Source {
            message: "no network interfaces reported by the system".into(),
        });
        assert!(matches!(err, CliError::Source { .. }));
        assert_eq!(
            err.to_string(),
            "Cannot read traffic counters: no network interfaces reported by the system"
        );
    }

    #[test]
    fn invalid_settings_become_validation_errors() {
        let err = CliError::from(CoreError::InvalidSettings {
            field: "maxHistoryDays".into(),
            reason: "must be at least one day".into(),
        });
        assert!(matches!(err, CliError::Validation { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid value for maxHistoryDays: must be at least one day"
        );
    }
}
