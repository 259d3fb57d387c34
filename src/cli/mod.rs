pub mod input;
pub mod render;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    tracker::{
        progress::DEFAULT_GOAL_MINUTES,
        storage::{
            record::DailyFocusRecord,
            store::{JsonStateStore, StateStore},
        },
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Focusflow", version, long_about = None)]
#[command(about = "Tracks how much of the day you spend focused", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Mirror logs to the console")]
    log: bool,
    #[arg(long = "log-filter", help = "Level written to the log files")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run the tracker in the foreground and watch progress toward the daily goal")]
    Watch {
        #[arg(
            long,
            help = "State directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = DEFAULT_GOAL_MINUTES,
            help = "Daily goal in minutes. Fixed for the whole session"
        )]
        goal: u32,
    },
    #[command(about = "Print today's progress without starting the tracker")]
    Status {
        #[arg(
            long,
            help = "State directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = DEFAULT_GOAL_MINUTES,
            help = "Daily goal in minutes"
        )]
        goal: u32,
    },
    #[command(about = "Zero out today's stored focus time")]
    Reset {
        #[arg(
            long,
            help = "State directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let state_dir = match &args.commands {
        Commands::Watch { dir, .. } | Commands::Status { dir, .. } | Commands::Reset { dir } => {
            dir.clone().map_or_else(create_application_default_path, Ok)?
        }
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        args.log_filter
    };
    enable_logging(&state_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Watch { goal, .. } => watch::process_watch_command(state_dir, goal).await,
        Commands::Status { goal, .. } => process_status_command(state_dir, goal).await,
        Commands::Reset { .. } => process_reset_command(state_dir).await,
    }
}

async fn process_status_command(state_dir: PathBuf, goal_minutes: u32) -> Result<()> {
    let store = JsonStateStore::new(state_dir)?;
    let today = DefaultClock.today();

    // A record from a previous day reads as an empty today, same as the tracker itself.
    let focus_ms = match store.load().await? {
        Some(record) if record.date == today => record.total_ms,
        _ => 0,
    };

    println!("{}", render::render_status(today, focus_ms, goal_minutes));
    Ok(())
}

async fn process_reset_command(state_dir: PathBuf) -> Result<()> {
    let store = JsonStateStore::new(state_dir)?;
    let today = DefaultClock.today();
    store
        .save(&DailyFocusRecord {
            date: today,
            total_ms: 0,
        })
        .await?;

    println!("Focus time for {today} has been reset");
    Ok(())
}
