//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod alerts;
pub mod connections;
pub mod history;
pub mod monitor;
pub mod settings;
pub mod status;
pub mod usage;

use netmon_core::SamplingEngine;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a data-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    engine: &SamplingEngine,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(engine, global),
        Command::Start => monitor::start(engine, global).await,
        Command::Stop => monitor::stop(engine, global).await,
        Command::Connections => connections::handle(engine, global),
        Command::History(args) => history::handle(engine, &args, global),
        Command::Alerts(args) => alerts::handle(engine, args, global),
        Command::Usage(args) => usage::handle(engine, &args, global),
        Command::Settings(args) => settings::handle(engine, args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Err(CliError::Internal(
            "completions must be generated before opening the data directory".into(),
        )),
    }
}
