//! Alert command handlers.

use chrono::Local;
use tabled::Tabled;

use netmon_core::{Alert, SamplingEngine};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Read")]
    read: String,
}

impl From<&Alert> for AlertRow {
    fn from(a: &Alert) -> Self {
        Self {
            id: a.id.clone(),
            time: a
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            kind: a.kind.to_string().to_uppercase(),
            message: a.message.clone(),
            read: if a.read { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    engine: &SamplingEngine,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let evaluator = engine.evaluator();

    match args.command.unwrap_or(AlertsCommand::List { unread: false }) {
        AlertsCommand::List { unread } => {
            let alerts = if unread {
                evaluator.unread()
            } else {
                evaluator.alerts()
            };
            if alerts.is_empty() && global.format() == OutputFormat::Table {
                output::notice("No alerts", global.quiet);
                return Ok(());
            }
            let out = output::render_list(
                global.format(),
                &alerts,
                |a| AlertRow::from(a),
                |a| a.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Read { id } => {
            if !evaluator.mark_read(&id)? {
                return Err(CliError::NotFound {
                    resource_type: "alert".into(),
                    identifier: id,
                    list_command: "alerts list".into(),
                });
            }
            output::notice("Alert marked read", global.quiet);
            Ok(())
        }

        AlertsCommand::Clear => {
            evaluator.clear()?;
            output::notice("All alerts cleared", global.quiet);
            Ok(())
        }
    }
}
