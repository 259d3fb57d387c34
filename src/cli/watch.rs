use std::path::PathBuf;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    tracker::{create_tracker, shutdown},
    utils::clock::DefaultClock,
};

use super::{input, render};

/// Runs the tracker in the foreground until Ctrl-C or a `quit` command, with stdin driving
/// visibility and reset events and the terminal acting as the presenter.
pub async fn process_watch_command(state_dir: PathBuf, goal_minutes: u32) -> Result<()> {
    let shutdown_token = CancellationToken::new();
    let (module, handle) = create_tracker(state_dir, &shutdown_token, DefaultClock)?;

    println!("Tracking focus time. Type 'pause', 'resume', 'reset' or 'quit'.");

    let (_, module_result, input_result, render_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        module.run(),
        input::forward_stdin_events(handle.events, shutdown_token.clone()),
        render::render_updates(handle.updates, goal_minutes, shutdown_token.clone()),
    );

    if let Err(e) = module_result {
        error!("Tracker module got an error {:?}", e);
    }
    if let Err(e) = input_result {
        error!("Input module got an error {:?}", e);
    }
    if let Err(e) = render_result {
        error!("Renderer got an error {:?}", e);
    }

    Ok(())
}
