//! `netmon status`.

use netmon_core::{MonitorState, SamplingEngine, StatusReport};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::format::{fmt_bytes, fmt_pct, fmt_speed};
use crate::output::{self, Painter};

pub fn handle(engine: &SamplingEngine, global: &GlobalOpts) -> Result<(), CliError> {
    let report = engine.status();
    let cap = engine.store().settings().daily_cap_bytes;
    let paint = Painter::new(global.color_mode());

    let out = output::render_single(
        global.format(),
        &report,
        |r| detail(r, cap, paint),
        |r| r.state.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(report: &StatusReport, cap: Option<u64>, p: Painter) -> String {
    let state = match report.state {
        MonitorState::Running => p.good("ACTIVE"),
        MonitorState::Idle => p.dim("INACTIVE"),
    };
    let mut lines = vec![format!("{} {state}", p.bold("Monitoring:"))];

    if report.state == MonitorState::Running {
        lines.push(String::new());
        lines.push(p.bold("Current speed"));
        lines.push(format!(
            "  ↓ Download   {}",
            p.value(&fmt_speed(report.stats.speed_in))
        ));
        lines.push(format!(
            "  ↑ Upload     {}",
            p.value(&fmt_speed(report.stats.speed_out))
        ));
    }

    lines.push(String::new());
    lines.push(p.bold("This session"));
    lines.push(format!(
        "  ↓ Downloaded {}",
        p.value(&fmt_bytes(report.stats.bytes_in))
    ));
    lines.push(format!(
        "  ↑ Uploaded   {}",
        p.value(&fmt_bytes(report.stats.bytes_out))
    ));

    let today = report.today.totals;
    lines.push(String::new());
    lines.push(p.bold(&format!("Today ({})", report.today.date)));
    lines.push(format!("  ↓ Downloaded {}", p.value(&fmt_bytes(today.bytes_in))));
    lines.push(format!("  ↑ Uploaded   {}", p.value(&fmt_bytes(today.bytes_out))));
    if let Some(cap) = cap {
        lines.push(format!(
            "  Daily cap    {} of {}",
            p.value(&fmt_pct(today.total(), cap)),
            fmt_bytes(cap)
        ));
    }

    lines.join("\n")
}
