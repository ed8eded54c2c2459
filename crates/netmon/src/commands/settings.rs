//! `netmon settings show|set`.

use netmon_core::{AlertThresholds, SamplingEngine, Settings, SettingsPatch};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::format::fmt_bytes;
use crate::output::{self, Painter};

pub fn handle(
    engine: &SamplingEngine,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = engine.store();

    let settings = match args.command.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => store.settings(),
        SettingsCommand::Set(set) => {
            let patch = patch_from(&set, store.settings().alert_thresholds);
            let updated = store.update_settings(&patch)?;
            output::notice("Settings updated", global.quiet);
            updated
        }
    };

    let paint = Painter::new(global.color_mode());
    let out = output::render_single(
        global.format(),
        &settings,
        |s| detail(s, paint),
        |s| s.refresh_interval_ms.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Thresholds are stored as one record; a flag for only one of them keeps
/// the other at its `current` value.
fn patch_from(set: &SettingsSetArgs, current: AlertThresholds) -> SettingsPatch {
    let alert_thresholds = if set.warning_pct.is_some() || set.critical_pct.is_some() {
        Some(AlertThresholds {
            warning_pct: set.warning_pct.unwrap_or(current.warning_pct),
            critical_pct: set.critical_pct.unwrap_or(current.critical_pct),
        })
    } else {
        None
    };
    SettingsPatch {
        refresh_interval_ms: set.refresh_interval_ms,
        max_history_days: set.max_history_days,
        alert_thresholds,
        daily_cap_bytes: set.daily_cap,
    }
}

fn detail(s: &Settings, p: Painter) -> String {
    let cap = s
        .daily_cap_bytes
        .map_or_else(|| "not set".to_owned(), fmt_bytes);
    [
        p.bold("Settings"),
        format!("  Refresh interval  {} ms", p.value(&s.refresh_interval_ms.to_string())),
        format!("  History kept      {} days", p.value(&s.max_history_days.to_string())),
        format!(
            "  Warning at        {}%",
            p.value(&s.alert_thresholds.warning_pct.to_string())
        ),
        format!(
            "  Critical at       {}%",
            p.value(&s.alert_thresholds.critical_pct.to_string())
        ),
        format!("  Daily cap         {}", p.value(&cap)),
    ]
    .join("\n")
}
