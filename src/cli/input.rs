use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::tracker::event::TrackerEvent;

/// Commands a user can type into a `watch` session. They stand in for the visibility and reset
/// callbacks a windowed host would deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Hide,
    Show,
    Reset,
    Quit,
}

pub fn parse_line(line: &str) -> Option<InputCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "hide" => Some(InputCommand::Hide),
        "s" | "show" | "resume" => Some(InputCommand::Show),
        "r" | "reset" => Some(InputCommand::Reset),
        "q" | "quit" | "exit" => Some(InputCommand::Quit),
        _ => None,
    }
}

/// Reads stdin line by line and forwards the recognized commands to the tracker until the
/// session shuts down or stdin closes.
pub async fn forward_stdin_events(
    events: mpsc::Sender<TrackerEvent>,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed; tracking continues until a signal arrives.
                    return Ok(());
                };
                match parse_line(&line) {
                    Some(InputCommand::Hide) => {
                        events
                            .send(TrackerEvent::VisibilityChanged { hidden: true })
                            .await?
                    }
                    Some(InputCommand::Show) => {
                        events
                            .send(TrackerEvent::VisibilityChanged { hidden: false })
                            .await?
                    }
                    Some(InputCommand::Reset) => events.send(TrackerEvent::ResetRequested).await?,
                    Some(InputCommand::Quit) => {
                        shutdown.cancel();
                        return Ok(());
                    }
                    None if line.trim().is_empty() => {}
                    None => debug!("Ignoring unrecognized input {line:?}"),
                }
            }
        }
    }
}
