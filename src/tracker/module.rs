use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::utils::clock::Clock;

use super::{
    accumulator::Accumulator,
    event::{ProgressUpdate, TrackerEvent},
    storage::{store::StateStore, Persistence},
};

/// Drives the [Accumulator] from a periodic tick and the inbound event channel, writing every
/// state change through to storage and publishing snapshots for the presenter.
///
/// Everything runs on one task: ticks and events are multiplexed with `select!` and each
/// handler finishes before the next one starts, so there is no interleaving to reason about.
pub struct TrackerModule<S> {
    events: mpsc::Receiver<TrackerEvent>,
    updates: watch::Sender<ProgressUpdate>,
    persistence: Persistence<S>,
    shutdown: CancellationToken,
    tick_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl<S: StateStore> TrackerModule<S> {
    pub fn new(
        events: mpsc::Receiver<TrackerEvent>,
        updates: watch::Sender<ProgressUpdate>,
        persistence: Persistence<S>,
        shutdown: CancellationToken,
        tick_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            events,
            updates,
            persistence,
            shutdown,
            tick_interval,
            time_provider,
        }
    }

    /// Executes the tracker event loop until cancellation or until every event sender is gone.
    pub async fn run(mut self) -> Result<()> {
        let restored = self.persistence.restore().await;
        let mut accumulator = Accumulator::initialize(
            self.time_provider.today(),
            restored,
            self.time_provider.time(),
            // A foreground session is visible from the moment it starts.
            false,
        );
        info!(
            "Tracking {} starting from {}ms",
            accumulator.date(),
            accumulator.focus_ms()
        );
        self.publish(&accumulator);

        let mut tick_point = self.time_provider.instant() + self.tick_interval;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return self.finalize(&accumulator).await;
                }
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.handle_event(&mut accumulator, event).await,
                        // All senders are gone, so nothing can change visibility or request a
                        // reset anymore.
                        None => return self.finalize(&accumulator).await,
                    }
                }
                _ = self.time_provider.sleep_until(tick_point) => {
                    tick_point += self.tick_interval;
                    self.handle_tick(&mut accumulator).await;
                }
            }
        }
    }

    async fn handle_tick(&self, accumulator: &mut Accumulator) {
        let now = self.time_provider.time();
        let rolled = accumulator.roll_over(self.time_provider.today(), now);
        if rolled {
            info!("Day changed, starting a fresh count for {}", accumulator.date());
        }
        let ticked = accumulator.tick(now);

        if rolled || ticked {
            self.persistence.write_through(&accumulator.snapshot()).await;
            self.publish(accumulator);
        }
    }

    async fn handle_event(&self, accumulator: &mut Accumulator, event: TrackerEvent) {
        let now = self.time_provider.time();
        match event {
            TrackerEvent::VisibilityChanged { hidden } => {
                debug!("Visibility changed, hidden: {hidden}");
                accumulator.on_visibility_change(now, hidden);
                // The total did not move, only the status did, so there is nothing to save.
                self.publish(accumulator);
            }
            TrackerEvent::ResetRequested => {
                info!("Resetting today's focus total");
                accumulator.reset(now);
                self.persistence.write_through(&accumulator.snapshot()).await;
                self.publish(accumulator);
            }
        }
    }

    async fn finalize(&self, accumulator: &Accumulator) -> Result<()> {
        self.persistence.write_through(&accumulator.snapshot()).await;
        Ok(())
    }

    fn publish(&self, accumulator: &Accumulator) {
        self.updates.send_replace(ProgressUpdate {
            date: accumulator.date(),
            focus_ms: accumulator.focus_ms(),
            is_active: accumulator.is_active(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::Result;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use tokio::{
        sync::{mpsc, watch},
        task::JoinHandle,
    };
    use tokio_util::sync::CancellationToken;

    use crate::{
        tracker::{
            event::{ProgressUpdate, TrackerEvent},
            storage::{record::DailyFocusRecord, store::MockStateStore, Persistence},
        },
        utils::{clock::testing::TestClock, clock::Clock, logging::TEST_LOGGING},
    };

    use super::TrackerModule;

    const TICK: Duration = Duration::from_secs(1);

    fn test_start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2018, 7, 4, 12, 0, 0).unwrap()
    }

    fn test_date() -> NaiveDate {
        test_start().date_naive()
    }

    fn expect_cold_load(store: &mut MockStateStore) {
        store.expect_load().times(1).returning(|| Ok(None));
    }

    /// Collects every record the module saves so tests can assert the write-through sequence.
    fn collect_saves(store: &mut MockStateStore) -> Arc<Mutex<Vec<DailyFocusRecord>>> {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = saved.clone();
        store.expect_save().returning(move |record| {
            sink.lock().unwrap().push(record.clone());
            Ok(())
        });
        saved
    }

    struct RunningModule {
        handle: JoinHandle<Result<()>>,
        events: mpsc::Sender<TrackerEvent>,
        updates: watch::Receiver<ProgressUpdate>,
        shutdown: CancellationToken,
    }

    impl RunningModule {
        fn spawn(store: MockStateStore, clock: TestClock) -> Self {
            *TEST_LOGGING;
            let (events, receiver) = mpsc::channel(10);
            let (updates_sender, updates) = watch::channel(ProgressUpdate {
                date: clock.today(),
                focus_ms: 0,
                is_active: false,
            });
            let shutdown = CancellationToken::new();
            let module = TrackerModule::new(
                receiver,
                updates_sender,
                Persistence::new(store),
                shutdown.clone(),
                TICK,
                Box::new(clock),
            );
            Self {
                handle: tokio::spawn(module.run()),
                events,
                updates,
                shutdown,
            }
        }

        async fn stop(self) -> Result<()> {
            self.shutdown.cancel();
            self.handle.await?
        }
    }

    fn totals(saved: &Arc<Mutex<Vec<DailyFocusRecord>>>) -> Vec<u64> {
        saved.lock().unwrap().iter().map(|v| v.total_ms).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_ticks_accumulate_and_write_through() -> Result<()> {
        let mut store = MockStateStore::new();
        expect_cold_load(&mut store);
        let saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        let last_update = *running.updates.borrow();
        running.stop().await?;

        // Three one-second ticks plus the shutdown flush.
        assert_eq!(totals(&saved), vec![1000, 2000, 3000, 3000]);
        assert_eq!(last_update.focus_ms, 3000);
        assert!(last_update.is_active);
        assert!(saved.lock().unwrap().iter().all(|v| v.date == test_date()));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_intervals_are_not_counted_or_saved() -> Result<()> {
        let mut store = MockStateStore::new();
        expect_cold_load(&mut store);
        let saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        running
            .events
            .send(TrackerEvent::VisibilityChanged { hidden: true })
            .await?;
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(!running.updates.borrow().is_active);
        running
            .events
            .send(TrackerEvent::VisibilityChanged { hidden: false })
            .await?;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        running.stop().await?;

        // Only the first tick and the one after the session became visible again credited
        // time; the two hidden ticks left no writes behind.
        assert_eq!(totals(&saved), vec![1000, 1500, 1500]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn reset_zeroes_the_total_and_saves_immediately() -> Result<()> {
        let mut store = MockStateStore::new();
        expect_cold_load(&mut store);
        let saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        running.events.send(TrackerEvent::ResetRequested).await?;
        tokio::time::sleep(Duration::from_millis(700)).await;
        running.stop().await?;

        assert_eq!(totals(&saved), vec![1000, 2000, 0, 500, 500]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stale_restored_record_starts_the_day_cold() -> Result<()> {
        let mut store = MockStateStore::new();
        store.expect_load().times(1).returning(|| {
            Ok(Some(DailyFocusRecord {
                date: NaiveDate::from_ymd_opt(2018, 7, 3).unwrap(),
                total_ms: 55_000,
            }))
        });
        let _saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let first_update = *running.updates.borrow();
        assert_eq!(first_update.focus_ms, 0);
        assert_eq!(first_update.date, test_date());
        running.stop().await?;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn matching_restored_record_resumes_the_count() -> Result<()> {
        let mut store = MockStateStore::new();
        store.expect_load().times(1).returning(|| {
            Ok(Some(DailyFocusRecord {
                date: test_date(),
                total_ms: 4200,
            }))
        });
        let saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        running.stop().await?;

        assert_eq!(totals(&saved), vec![5200, 5200]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn midnight_rollover_rekeys_and_zeroes_the_record() -> Result<()> {
        let mut store = MockStateStore::new();
        expect_cold_load(&mut store);
        let saved = collect_saves(&mut store);

        let before_midnight = Local.with_ymd_and_hms(2018, 7, 4, 23, 59, 58).unwrap();
        let running = RunningModule::spawn(store, TestClock::starting_at(before_midnight));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        running.stop().await?;

        // One tick before midnight, the rollover write at midnight, one credited tick after.
        assert_eq!(totals(&saved), vec![1000, 0, 1000, 1000]);
        let dates: Vec<_> = saved.lock().unwrap().iter().map(|v| v.date).collect();
        let next_day = NaiveDate::from_ymd_opt(2018, 7, 5).unwrap();
        assert_eq!(dates, vec![test_date(), next_day, next_day, next_day]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_all_senders_flushes_and_stops() -> Result<()> {
        let mut store = MockStateStore::new();
        expect_cold_load(&mut store);
        let saved = collect_saves(&mut store);

        let running = RunningModule::spawn(store, TestClock::starting_at(test_start()));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(running.events);
        running.handle.await??;

        assert_eq!(totals(&saved), vec![1000, 1000]);
        Ok(())
    }
}
