//! Persistence for the single current-day record.
//! The basic idea is:
//!  - One JSON document in the application directory holds today's total.
//!  - Every state change overwrites the whole document.
//!  - Anything unreadable counts as "no prior state", never as a failure.

pub mod record;
pub mod store;

use tracing::warn;

use record::DailyFocusRecord;
use store::StateStore;

/// Best-effort bridge between the tracker loop and a [StateStore]. Reads happen once at
/// startup; writes follow every state-changing operation and may silently fail, in which case
/// the in-memory count stays authoritative for the session.
pub struct Persistence<S> {
    store: S,
}

impl<S: StateStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Startup read. Anything unreadable means a cold start, not an error.
    pub async fn restore(&self) -> Option<DailyFocusRecord> {
        match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to read saved state, starting cold: {e:?}");
                None
            }
        }
    }

    /// Write-through of the latest snapshot. The worst a failure costs is today's count on the
    /// next restart, so it must never interrupt measurement.
    pub async fn write_through(&self, record: &DailyFocusRecord) {
        if let Err(e) = self.store.save(record).await {
            warn!("Failed to persist {record:?}: {e:?}");
        }
    }
}
