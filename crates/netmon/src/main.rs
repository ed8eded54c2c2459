mod cli;
mod commands;
mod error;
mod format;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use netmon_core::{DataSource, SamplingEngine, Store, SystemSource};

use crate::cli::{Cli, Command};
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(exit_code::GENERAL);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Shell completions generation touches neither config nor data
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "netmon", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = netmon_config::load_config()?;
            global.apply_defaults(&cfg.defaults);

            let data_dir = netmon_config::resolve_data_dir(global.data_dir.as_deref(), &cfg);
            let store = Arc::new(Store::open(&data_dir)?);
            let source: Arc<dyn DataSource> = Arc::new(SystemSource::new());
            let engine = SamplingEngine::new(store, source);

            tracing::debug!(command = ?cmd, data_dir = %data_dir.display(), "dispatching command");
            commands::dispatch(cmd, &engine, &global).await
        }
    }
}
