use chrono::{DateTime, Local, NaiveDate};

use super::storage::record::DailyFocusRecord;

/// Largest gap between two ticks that still counts as continuous foreground time, in
/// milliseconds. A delta at or above this means the timer was throttled or the device slept, and
/// the whole gap is dropped instead of being credited.
pub const MAX_TICK_GAP_MS: i64 = 10_000;

/// Sums up foreground time observed since local midnight.
///
/// The accumulator never reads the environment itself. The caller feeds it instants from a
/// [Clock](crate::utils::clock::Clock) and visibility transitions, and asks for a
/// [DailyFocusRecord] snapshot whenever it wants to persist.
#[derive(Debug)]
pub struct Accumulator {
    today: NaiveDate,
    focus_ms: u64,
    last_timestamp: DateTime<Local>,
    is_active: bool,
}

impl Accumulator {
    /// Seeds the state for a new session. A restored record only counts when it was written on
    /// the same calendar day; anything older is stale and ignored.
    pub fn initialize(
        today: NaiveDate,
        restored: Option<DailyFocusRecord>,
        now: DateTime<Local>,
        hidden: bool,
    ) -> Self {
        let focus_ms = match restored {
            Some(record) if record.date == today => record.total_ms,
            _ => 0,
        };
        Self {
            today,
            focus_ms,
            last_timestamp: now,
            is_active: !hidden,
        }
    }

    /// Rebases the measurement point without crediting any time. Crediting here would either
    /// double count the interval before the transition or count hidden time after it.
    pub fn on_visibility_change(&mut self, now: DateTime<Local>, hidden: bool) {
        self.is_active = !hidden;
        self.last_timestamp = now;
    }

    /// Advances the counter by the time since the previous tick. Returns whether any time was
    /// credited, which is the signal to persist and repaint.
    ///
    /// The delta is credited only while active and only when `0 < delta < MAX_TICK_GAP_MS`.
    /// Non-positive deltas come from clock skew, oversized ones from suspend or timer
    /// throttling; both are discarded entirely, with the timestamp rebased so the next tick
    /// measures from here.
    pub fn tick(&mut self, now: DateTime<Local>) -> bool {
        let delta = (now - self.last_timestamp).num_milliseconds();
        self.last_timestamp = now;

        if self.is_active && delta > 0 && delta < MAX_TICK_GAP_MS {
            self.focus_ms += delta as u64;
            true
        } else {
            false
        }
    }

    /// Starts a fresh count when the calendar date has advanced past the day this accumulator
    /// was counting for. Returns whether a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate, now: DateTime<Local>) -> bool {
        if today == self.today {
            return false;
        }
        self.today = today;
        self.focus_ms = 0;
        self.last_timestamp = now;
        true
    }

    /// Drops today's count on user request.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.focus_ms = 0;
        self.last_timestamp = now;
    }

    pub fn snapshot(&self) -> DailyFocusRecord {
        DailyFocusRecord {
            date: self.today,
            total_ms: self.focus_ms,
        }
    }

    pub fn focus_ms(&self) -> u64 {
        self.focus_ms
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn date(&self) -> NaiveDate {
        self.today
    }
}
