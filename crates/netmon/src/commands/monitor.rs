//! `netmon start` and `netmon stop`.
//!
//! A session lives inside this process: `start` runs it in the foreground
//! and prints one line per tick until the budget runs out or Ctrl-C.

use std::pin::pin;

use netmon_core::{
    AlertKind, CurrentStats, DEFAULT_SESSION_BUDGET, SamplingEngine, SessionSummary, StartOutcome,
};
use tracing::warn;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::format::{fmt_bytes, fmt_duration, fmt_speed};
use crate::output::{self, Painter};

pub async fn start(engine: &SamplingEngine, global: &GlobalOpts) -> Result<(), CliError> {
    let mut stats = engine.subscribe_stats();

    if engine.start(DEFAULT_SESSION_BUDGET).await? == StartOutcome::AlreadyRunning {
        output::notice("Already monitoring", global.quiet);
        return Ok(());
    }
    let _ = stats.borrow_and_update();

    let paint = Painter::new(global.color_mode());
    let live = global.format() == OutputFormat::Table && !global.quiet;
    output::notice(
        &format!(
            "Monitoring for {}, press Ctrl-C to stop early",
            fmt_duration(u32::try_from(DEFAULT_SESSION_BUDGET.as_secs()).unwrap_or(u32::MAX))
        ),
        global.quiet,
    );

    let mut wait = pin!(engine.wait());
    let mut ctrl_c = pin!(tokio::signal::ctrl_c());
    let mut interrupted = false;

    let summary = loop {
        tokio::select! {
            biased;
            summary = &mut wait => break summary?,
            res = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if let Err(e) = res {
                    warn!(error = %e, "cannot listen for Ctrl-C");
                    continue;
                }
                output::notice("Stopping...", global.quiet);
                if let Some(summary) = engine.stop().await? {
                    break Some(summary);
                }
            }
            Ok(()) = stats.changed() => {
                if live {
                    let line = tick_line(&stats.borrow_and_update(), paint);
                    output::print_output(&line, false);
                }
            }
        }
    };

    print_summary(summary.as_ref(), global)
}

pub async fn stop(engine: &SamplingEngine, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = engine.stop().await?;
    if summary.is_none() {
        output::notice(
            "Not monitoring. Sessions run inside `netmon start` and end with it.",
            global.quiet,
        );
        return Ok(());
    }
    print_summary(summary.as_ref(), global)
}

fn tick_line(stats: &CurrentStats, p: Painter) -> String {
    format!(
        "↓ {:>12}  ↑ {:>12}   {} ↓ {}  ↑ {}",
        p.good(&fmt_speed(stats.speed_in)),
        p.warn(&fmt_speed(stats.speed_out)),
        p.dim("session"),
        p.value(&fmt_bytes(stats.bytes_in)),
        p.value(&fmt_bytes(stats.bytes_out)),
    )
}

fn print_summary(summary: Option<&SessionSummary>, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(summary) = summary else {
        output::notice("No session was recorded", global.quiet);
        return Ok(());
    };
    let paint = Painter::new(global.color_mode());
    let out = output::render_single(
        global.format(),
        summary,
        |s| summary_detail(s, paint),
        |s| s.entry.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn summary_detail(summary: &SessionSummary, p: Painter) -> String {
    let entry = &summary.entry;
    let mut lines = vec![
        p.bold(&format!("Session saved ({})", summary.ended_by)),
        format!("  ID           {}", entry.id),
        format!("  Duration     {}", fmt_duration(entry.duration_seconds)),
        format!("  ↓ Downloaded {}", p.value(&fmt_bytes(entry.bytes_in))),
        format!("  ↑ Uploaded   {}", p.value(&fmt_bytes(entry.bytes_out))),
    ];
    if let Some(alert) = &summary.alert {
        let tag = format!("[{}]", alert.kind.to_string().to_uppercase());
        let tag = match alert.kind {
            AlertKind::Warning => p.warn(&tag),
            AlertKind::Critical => p.bad(&tag),
        };
        lines.push(String::new());
        lines.push(format!("{tag} {}", alert.message));
    }
    lines.join("\n")
}
