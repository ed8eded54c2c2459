//! `netmon connections`.

use tabled::Tabled;

use netmon_core::{ConnectionInfo, SamplingEngine};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Local Port")]
    local_port: u16,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "App")]
    app: String,
}

impl From<&ConnectionInfo> for ConnectionRow {
    fn from(c: &ConnectionInfo) -> Self {
        Self {
            protocol: c.protocol.clone(),
            local_port: c.local_port,
            remote: format!("{}:{}", c.remote_host, c.remote_port),
            state: c.state.clone(),
            app: c.owner_app.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(engine: &SamplingEngine, global: &GlobalOpts) -> Result<(), CliError> {
    // Outside a session there is no tick snapshot; ask the source directly.
    let connections = if engine.is_monitoring() {
        engine.connections()
    } else {
        engine.source().list_connections()
    };

    if connections.is_empty() && global.format() == OutputFormat::Table {
        output::notice("No active connections", global.quiet);
        return Ok(());
    }

    let out = output::render_list(
        global.format(),
        &connections,
        |c| ConnectionRow::from(c),
        |c| format!("{} {} {}:{}", c.protocol, c.local_port, c.remote_host, c.remote_port),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
