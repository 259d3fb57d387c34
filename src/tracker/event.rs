use chrono::NaiveDate;

/// Inbound notification from the hosting environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The session left or entered the foreground.
    VisibilityChanged { hidden: bool },
    /// The user asked to drop today's count.
    ResetRequested,
}

/// Snapshot published to the presenter whenever the tracked state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub date: NaiveDate,
    pub focus_ms: u64,
    pub is_active: bool,
}
