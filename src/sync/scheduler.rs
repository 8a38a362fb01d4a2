use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Polling,
    Paused,
    Disposed,
}

/// Whether the host view is currently shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Work performed on every timer tick
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run_cycle(&self);
}

struct SchedulerInner {
    state: SchedulerState,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl SchedulerInner {
    fn cancel_timer(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Periodic refresh timer with visibility-aware pausing.
///
/// At most one timer task exists at any time: every transition that arms a
/// timer aborts the previous one first. The runner is held weakly so the
/// scheduler never keeps its owner alive.
pub struct RefreshScheduler {
    runner: Weak<dyn CycleRunner>,
    inner: Mutex<SchedulerInner>,
}

impl RefreshScheduler {
    pub fn new(runner: Weak<dyn CycleRunner>, interval: Duration) -> Self {
        Self {
            runner,
            inner: Mutex::new(SchedulerInner {
                state: SchedulerState::Idle,
                interval,
                task: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self) -> Result<MutexGuard<'_, SchedulerInner>, DashboardError> {
        let inner = self.lock();
        if inner.state == SchedulerState::Disposed {
            return Err(DashboardError::Disposed);
        }
        Ok(inner)
    }

    /// Spawn the tick loop; first tick fires one full interval from now
    fn arm(&self, inner: &mut SchedulerInner) {
        inner.cancel_timer();

        let period = inner.interval;
        let runner = self.runner.clone();

        inner.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let Some(runner) = runner.upgrade() else {
                    log::debug!("Refresh runner dropped, stopping timer");
                    break;
                };

                log::debug!("Refresh tick");
                tokio::spawn(async move {
                    runner.run_cycle().await;
                });
            }
        }));
        inner.state = SchedulerState::Polling;
    }

    /// Idle → Polling. Returns `true` when a timer was armed.
    ///
    /// No-op while already polling, and a paused scheduler stays paused until
    /// the view becomes visible again.
    pub fn start(&self) -> Result<bool, DashboardError> {
        let mut inner = self.live()?;
        match inner.state {
            SchedulerState::Idle => {
                self.arm(&mut inner);
                log::info!("Polling every {} ms", inner.interval.as_millis());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn stop(&self) -> Result<(), DashboardError> {
        let mut inner = self.live()?;
        inner.cancel_timer();
        inner.state = SchedulerState::Idle;
        Ok(())
    }

    /// Returns `true` when polling resumed, so the caller can refresh at once
    pub fn set_visibility(&self, visibility: Visibility) -> Result<bool, DashboardError> {
        let mut inner = self.live()?;
        match (visibility, inner.state) {
            (Visibility::Hidden, SchedulerState::Polling) => {
                inner.cancel_timer();
                inner.state = SchedulerState::Paused;
                log::info!("View hidden, polling paused");
                Ok(false)
            }
            (Visibility::Visible, SchedulerState::Paused | SchedulerState::Idle) => {
                self.arm(&mut inner);
                log::info!("View visible, polling resumed");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Store a new interval; an active timer is cancelled and re-armed with it
    pub fn set_interval(&self, interval: Duration) -> Result<(), DashboardError> {
        let mut inner = self.live()?;
        inner.interval = interval;
        if inner.state == SchedulerState::Polling {
            self.arm(&mut inner);
            log::info!("Polling interval changed to {} ms", interval.as_millis());
        }
        Ok(())
    }

    /// Terminal. Safe to call more than once.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.state = SchedulerState::Disposed;
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state
    }

    pub fn interval(&self) -> Duration {
        self.lock().interval
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.lock().cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_secs(10);

    #[derive(Default)]
    struct CountingRunner {
        cycles: AtomicUsize,
    }

    #[async_trait]
    impl CycleRunner for CountingRunner {
        async fn run_cycle(&self) {
            self.cycles.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingRunner {
        fn cycles(&self) -> usize {
            self.cycles.load(Ordering::SeqCst)
        }
    }

    fn scheduler(runner: &Arc<CountingRunner>, period: Duration) -> RefreshScheduler {
        let weak: Weak<dyn CycleRunner> = Arc::downgrade(runner) as Weak<dyn CycleRunner>;
        RefreshScheduler::new(weak, period)
    }

    async fn wait(intervals: f64) {
        tokio::time::sleep(PERIOD.mul_f64(intervals)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_single_timer() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        assert!(scheduler.start().unwrap());
        assert!(!scheduler.start().unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Polling);

        wait(0.5).await;
        assert_eq!(runner.cycles(), 0);

        wait(3.0).await;
        assert_eq!(runner.cycles(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_armed_timer() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        scheduler.start().unwrap();
        scheduler.dispose();
        wait(5.5).await;

        assert_eq!(runner.cycles(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Disposed);
        assert_eq!(scheduler.start(), Err(DashboardError::Disposed));
        assert_eq!(scheduler.set_visibility(Visibility::Visible), Err(DashboardError::Disposed));
        scheduler.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_pauses_visible_resumes() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        scheduler.start().unwrap();
        wait(1.5).await;
        assert_eq!(runner.cycles(), 1);

        assert!(!scheduler.set_visibility(Visibility::Hidden).unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Paused);
        wait(3.0).await;
        assert_eq!(runner.cycles(), 1);

        // start does not override a pause
        assert!(!scheduler.start().unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Paused);

        assert!(scheduler.set_visibility(Visibility::Visible).unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Polling);
        wait(1.5).await;
        assert_eq!(runner.cycles(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_starts_idle_scheduler() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        assert!(!scheduler.set_visibility(Visibility::Hidden).unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.set_visibility(Visibility::Visible).unwrap());
        assert_eq!(scheduler.state(), SchedulerState::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_rearms() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        scheduler.start().unwrap();
        wait(0.5).await;

        // re-armed at t=5s with a 2s period: ticks at 7s and 9s
        scheduler.set_interval(Duration::from_secs(2)).unwrap();
        assert_eq!(scheduler.interval(), Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(runner.cycles(), 1);

        // the old 10s timer must not fire alongside the new one
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(runner.cycles(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_returns_to_idle() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        scheduler.start().unwrap();
        scheduler.stop().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        wait(2.5).await;
        assert_eq!(runner.cycles(), 0);

        scheduler.set_interval(Duration::from_secs(1)).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_runner_ends_ticks() {
        let runner = Arc::new(CountingRunner::default());
        let scheduler = scheduler(&runner, PERIOD);

        scheduler.start().unwrap();
        drop(runner);
        wait(2.5).await;
        assert_eq!(scheduler.state(), SchedulerState::Polling);
    }
}
