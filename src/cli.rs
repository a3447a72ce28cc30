use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use wellbeing_timer::platform::common::DATA_DIR_ENV;

/// Daily diary session timer
///
/// Gives the diary a daily budget of one to thirty minutes, warns when five
/// minutes are left, closes the diary when time runs out and keeps diary
/// input locked until the next day.
#[derive(Parser, Debug)]
#[command(name = "wellbeing-timer")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding settings, session budget and journal
    #[arg(long, env = DATA_DIR_ENV, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open today's diary session
    Run {
        /// Do not send desktop notifications
        #[arg(long)]
        no_notify: bool,

        /// Countdown tick interval in milliseconds
        #[arg(long, default_value = "1000", hide = true)]
        tick_millis: u64,
    },
    /// Show today's session budget without changing it
    Status,
    /// View or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set the daily limit (1 to 30 minutes)
    SetLimit(LimitArgs),
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct LimitArgs {
    /// Limit in seconds (60-1800)
    #[arg(long)]
    pub seconds: Option<u32>,

    /// Limit in minutes (1-30)
    #[arg(long)]
    pub minutes: Option<u32>,
}

impl LimitArgs {
    pub fn to_seconds(&self) -> u32 {
        match (self.seconds, self.minutes) {
            (Some(seconds), _) => seconds,
            (None, Some(minutes)) => minutes.saturating_mul(60),
            (None, None) => 0,
        }
    }
}
