//! `netmon usage`: one calendar day, or a trailing window with `--days`.

use netmon_core::{DailyUsage, RollingUsage, SamplingEngine, UsageTotals};

use crate::cli::{GlobalOpts, UsageArgs};
use crate::error::CliError;
use crate::format::{fmt_bytes, fmt_pct};
use crate::output::{self, Painter};

pub fn handle(
    engine: &SamplingEngine,
    args: &UsageArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let paint = Painter::new(global.color_mode());

    let out = if let Some(days) = args.days {
        let usage = engine.aggregator().rolling_usage(days);
        output::render_single(
            global.format(),
            &usage,
            |u| rolling_detail(u, paint),
            |u| u.totals.total().to_string(),
        )?
    } else {
        let usage = match args.date {
            Some(date) => engine.daily_usage(date),
            None => engine.aggregator().today(),
        };
        let cap = engine.store().settings().daily_cap_bytes;
        output::render_single(
            global.format(),
            &usage,
            |u| daily_detail(u, cap, paint),
            |u| u.totals.total().to_string(),
        )?
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn totals_lines(totals: UsageTotals, p: Painter) -> Vec<String> {
    vec![
        format!("  ↓ Downloaded {}", p.value(&fmt_bytes(totals.bytes_in))),
        format!("  ↑ Uploaded   {}", p.value(&fmt_bytes(totals.bytes_out))),
        format!("  Total        {}", p.value(&fmt_bytes(totals.total()))),
    ]
}

fn daily_detail(usage: &DailyUsage, cap: Option<u64>, p: Painter) -> String {
    let mut lines = vec![p.bold(&format!("Usage on {}", usage.date))];
    lines.extend(totals_lines(usage.totals, p));
    if let Some(cap) = cap {
        lines.push(format!(
            "  Daily cap    {} of {}",
            fmt_pct(usage.totals.total(), cap),
            fmt_bytes(cap)
        ));
    }
    lines.join("\n")
}

fn rolling_detail(usage: &RollingUsage, p: Painter) -> String {
    let plural = if usage.days == 1 { "" } else { "s" };
    let mut lines = vec![p.bold(&format!(
        "Usage over the last {} day{plural} ({} sessions)",
        usage.days, usage.sessions
    ))];
    lines.extend(totals_lines(usage.totals, p));
    lines.join("\n")
}
