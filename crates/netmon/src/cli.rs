//! Clap derive structures for the `netmon` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use netmon_config::Defaults;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netmon -- watch network throughput and track daily usage
#[derive(Debug, Parser)]
#[command(
    name = "netmon",
    version,
    about = "Monitor network traffic from the command line",
    long_about = "Samples interface byte counters, shows live transfer rates,\n\
        keeps a per-session usage history and raises alerts when daily\n\
        usage crosses a configured share of the daily cap.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding history, settings and alerts
    #[arg(long, env = "NETMON_DATA_DIR", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "NETMON_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Fill unset output options from the config file.
    pub fn apply_defaults(&mut self, defaults: &Defaults) {
        if self.output.is_none() {
            self.output = OutputFormat::from_str(&defaults.output, true).ok();
        }
        if self.color.is_none() {
            self.color = ColorMode::from_str(&defaults.color, true).ok();
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show monitoring state, live rates and today's usage
    #[command(alias = "st")]
    Status,

    /// Monitor traffic in the foreground for 30 seconds (Ctrl-C stops early)
    Start,

    /// Stop the monitoring session owned by this process
    Stop,

    /// List network connections
    #[command(alias = "conn")]
    Connections,

    /// Show recent monitoring sessions, newest first
    History(HistoryArgs),

    /// List, acknowledge and clear usage alerts
    Alerts(AlertsArgs),

    /// Show data usage for a day or a trailing window
    Usage(UsageArgs),

    /// Show or change monitoring settings
    Settings(SettingsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Maximum number of sessions to show
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: Option<AlertsCommand>,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts (default)
    #[command(alias = "ls")]
    List {
        /// Only show alerts not yet marked read
        #[arg(long, short = 'u')]
        unread: bool,
    },

    /// Mark one alert as read
    Read {
        /// Alert ID (a-...)
        id: String,
    },

    /// Delete every alert
    Clear,
}

// ── Usage ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsageArgs {
    /// Calendar day to report (YYYY-MM-DD, local time) [default: today]
    #[arg(long, conflicts_with = "days")]
    pub date: Option<NaiveDate>,

    /// Report the trailing window of this many days instead of one day
    #[arg(
        long,
        short = 'd',
        value_parser = clap::value_parser!(u32).range(1..=3650)
    )]
    pub days: Option<u32>,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommand>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings (default)
    Show,

    /// Change one or more settings
    #[command(arg_required_else_help = true)]
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    /// Sampling interval in milliseconds
    #[arg(long)]
    pub refresh_interval_ms: Option<u32>,

    /// Days of session history to keep
    #[arg(long)]
    pub max_history_days: Option<u32>,

    /// Warning threshold, percent of the daily cap
    #[arg(long)]
    pub warning_pct: Option<u8>,

    /// Critical threshold, percent of the daily cap
    #[arg(long)]
    pub critical_pct: Option<u8>,

    /// Daily cap in bytes (in + out); 0 removes the cap
    #[arg(long)]
    pub daily_cap: Option<u64>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
