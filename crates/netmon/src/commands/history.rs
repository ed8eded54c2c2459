//! `netmon history`.

use chrono::Local;
use tabled::Tabled;

use netmon_core::{HistoryEntry, SamplingEngine};

use crate::cli::{GlobalOpts, HistoryArgs, OutputFormat};
use crate::error::CliError;
use crate::format::{fmt_bytes, fmt_duration};
use crate::output;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "↓ In")]
    bytes_in: String,
    #[tabled(rename = "↑ Out")]
    bytes_out: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(e: &HistoryEntry) -> Self {
        Self {
            id: e.id.clone(),
            time: e
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            duration: fmt_duration(e.duration_seconds),
            bytes_in: fmt_bytes(e.bytes_in),
            bytes_out: fmt_bytes(e.bytes_out),
        }
    }
}

pub fn handle(
    engine: &SamplingEngine,
    args: &HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entries = engine.history(args.limit);

    if entries.is_empty() && global.format() == OutputFormat::Table {
        output::notice("No history available", global.quiet);
        return Ok(());
    }

    let out = output::render_list(
        global.format(),
        &entries,
        |e| HistoryRow::from(e),
        |e| e.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
