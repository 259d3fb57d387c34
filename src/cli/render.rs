use std::io::Write;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::tracker::{
    event::ProgressUpdate,
    progress::{format_hms, minutes, progress_ratio, status_line, Motivation},
};

const BAR_WIDTH: usize = 24;

/// Textual stand-in for a radial progress indicator.
fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

/// Terminal presenter for the `watch` session. Owns nothing but the goal; all state arrives as
/// [ProgressUpdate]s.
pub struct ProgressRenderer {
    goal_minutes: u32,
}

impl ProgressRenderer {
    pub fn new(goal_minutes: u32) -> Self {
        Self { goal_minutes }
    }

    pub fn render_line(&self, update: &ProgressUpdate) -> String {
        let ratio = progress_ratio(update.focus_ms, self.goal_minutes);
        let percent = (ratio * 100.).round() as u32;
        let status = if update.is_active {
            Colour::Green.paint(status_line(true))
        } else {
            Colour::Yellow.paint(status_line(false))
        };

        format!(
            "{} [{}] {percent:>3}% {} of {} min  {}  {}",
            Style::new().bold().paint(format_hms(update.focus_ms)),
            progress_bar(ratio, BAR_WIDTH),
            minutes(update.focus_ms),
            self.goal_minutes,
            Motivation::for_ratio(ratio).message(),
            status,
        )
    }
}

/// Repaints the progress line whenever the tracker publishes a new snapshot.
pub async fn render_updates(
    mut updates: watch::Receiver<ProgressUpdate>,
    goal_minutes: u32,
    shutdown: CancellationToken,
) -> Result<()> {
    let renderer = ProgressRenderer::new(goal_minutes);
    let mut out = std::io::stdout();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                writeln!(out)?;
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    writeln!(out)?;
                    return Ok(());
                }
                let update = *updates.borrow_and_update();
                // \r with an erase keeps the session on a single repainted line.
                write!(out, "\r\x1b[2K{}", renderer.render_line(&update))?;
                out.flush()?;
            }
        }
    }
}

/// One-shot summary for the `status` command.
pub fn render_status(date: NaiveDate, focus_ms: u64, goal_minutes: u32) -> String {
    let ratio = progress_ratio(focus_ms, goal_minutes);
    format!(
        "{date}  {}  {} of {goal_minutes} min ({:.0}%)\n{}",
        format_hms(focus_ms),
        minutes(focus_ms),
        ratio * 100.,
        Motivation::for_ratio(ratio).message(),
    )
}
