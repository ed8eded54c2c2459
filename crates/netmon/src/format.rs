//! Human-readable byte, rate and duration formatting helpers.

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary (1024) steps and up to two decimals,
/// trailing zeros trimmed: `0 B`, `1.5 KB`, `2 MB`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes(bytes: u64) -> String {
    fmt_scaled(bytes as f64)
}

/// Format a rate in bytes/sec as `12.3 KB/s`.
pub fn fmt_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", fmt_scaled(bytes_per_sec))
}

fn fmt_scaled(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0 B".into();
    }
    let mut scaled = value;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{scaled:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS.get(unit).copied().unwrap_or("TB"))
}

/// Format seconds as `45s`, `2m 05s` or `1h 02m`.
pub fn fmt_duration(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// Format `part` as a percentage of `whole` with one decimal.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_pct(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "-".into();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}
