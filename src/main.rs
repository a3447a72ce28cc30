use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use wellbeing_timer::commands;
use wellbeing_timer::commands::utils::init_logging;
use wellbeing_timer::platform::common::default_data_dir;
use wellbeing_timer::session::SystemDayClock;
use wellbeing_timer::settings::SettingsStore;

mod cli;

use cli::{Args, Commands, SettingsCommands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let settings = SettingsStore::in_dir(&data_dir).load();
    init_logging(args.verbose, &settings.logging.level);
    tracing::debug!("Using data directory {}", data_dir.display());

    match args.command {
        Commands::Run {
            no_notify,
            tick_millis,
        } => run_diary(data_dir, no_notify, tick_millis),
        Commands::Status => commands::show_status(&data_dir, &SystemDayClock),
        Commands::Settings { command } => match command {
            SettingsCommands::Show => commands::show_settings(&data_dir),
            SettingsCommands::SetLimit(limit) => commands::set_limit(&data_dir, limit.to_seconds()),
        },
    }
}

/// Run the interactive session on a single-threaded event loop
fn run_diary(data_dir: PathBuf, no_notify: bool, tick_millis: u64) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start event loop")?;

    let tick_interval = Duration::from_millis(tick_millis.max(1));
    let outcome = runtime.block_on(commands::run_session(
        &data_dir,
        &SystemDayClock,
        no_notify,
        tick_interval,
    ))?;

    tracing::debug!("Session ended: {:?}", outcome);
    Ok(())
}
