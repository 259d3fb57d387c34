use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::utils::clock::Clock;

use event::{ProgressUpdate, TrackerEvent};
use module::TrackerModule;
use storage::{store::JsonStateStore, Persistence};

pub mod accumulator;
pub mod event;
pub mod module;
pub mod progress;
pub mod shutdown;
pub mod storage;

/// Nominal cadence of the accumulation step.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Channel ends the hosting environment keeps: feed visibility and reset events in, read
/// progress snapshots out.
pub struct TrackerHandle {
    pub events: mpsc::Sender<TrackerEvent>,
    pub updates: watch::Receiver<ProgressUpdate>,
}

/// Builds a tracker persisting into `state_dir`, ready to be `run` by the caller alongside its
/// event sources.
pub fn create_tracker(
    state_dir: PathBuf,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> Result<(TrackerModule<JsonStateStore>, TrackerHandle)> {
    let (sender, receiver) = mpsc::channel::<TrackerEvent>(EVENT_CHANNEL_CAPACITY);
    // Placeholder until the module publishes the restored state; receivers only wake on the
    // first real update.
    let (updates_sender, updates_receiver) = watch::channel(ProgressUpdate {
        date: clock.today(),
        focus_ms: 0,
        is_active: false,
    });

    let store = JsonStateStore::new(state_dir)?;
    let module = TrackerModule::new(
        receiver,
        updates_sender,
        Persistence::new(store),
        shutdown_token.clone(),
        DEFAULT_TICK_INTERVAL,
        Box::new(clock),
    );

    Ok((
        module,
        TrackerHandle {
            events: sender,
            updates: updates_receiver,
        },
    ))
}
