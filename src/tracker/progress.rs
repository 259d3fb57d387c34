//! Read-only helpers the presenter derives its output from: time formatting, goal progress and
//! the motivational tier.

/// Daily goal used when the user does not pass one. Fixed for the whole session.
pub const DEFAULT_GOAL_MINUTES: u32 = 120;

/// Formats milliseconds as `HH:MM:SS`. Hours keep growing past 99 instead of wrapping.
pub fn format_hms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let h = total_seconds / 3600;
    let m = total_seconds % 3600 / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Whole minutes collected so far.
pub fn minutes(ms: u64) -> u64 {
    ms / 60_000
}

/// Fraction of the daily goal reached, clamped to 1.0.
pub fn progress_ratio(focus_ms: u64, goal_minutes: u32) -> f64 {
    let goal_ms = u64::from(goal_minutes) * 60_000;
    if goal_ms == 0 {
        return 1.0;
    }
    (focus_ms as f64 / goal_ms as f64).min(1.0)
}

/// Message tier keyed on the progress ratio. The highest threshold at or below the ratio wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motivation {
    NotStarted,
    Started,
    Halfway,
    ClosingIn,
    GoalReached,
}

impl Motivation {
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            Motivation::GoalReached
        } else if ratio >= 0.75 {
            Motivation::ClosingIn
        } else if ratio >= 0.5 {
            Motivation::Halfway
        } else if ratio > 0.0 {
            Motivation::Started
        } else {
            Motivation::NotStarted
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Motivation::NotStarted => "Ready when you are. Keep going",
            Motivation::Started => "Nice start, protect this focus",
            Motivation::Halfway => "Halfway there, keep going",
            Motivation::ClosingIn => "So close, stay in the zone",
            Motivation::GoalReached => "Amazing work! You've hit your goal",
        }
    }
}

/// One-line tracking status shown next to the progress.
pub fn status_line(is_active: bool) -> &'static str {
    if is_active {
        "Tracking – focus is active"
    } else {
        "Paused – focus is away"
    }
}
