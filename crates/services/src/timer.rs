//! One-second countdown driven by the tokio clock.

use std::time::Duration;

use assess_core::countdown::{Countdown, CountdownStep};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const PERIOD: Duration = Duration::from_secs(1);

/// A countdown with at most one active cycle.
///
/// `start(n, ..)` reports `n` ticks, one per second, the last carrying `0`,
/// then calls `on_expire` once. Starting again or stopping cancels the
/// running cycle, and dropping the timer stops it.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    cycle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called from within a tokio runtime unless `initial` is zero,
    /// which expires immediately on the caller's stack.
    pub fn start<T, E>(&mut self, initial: u32, mut on_tick: T, on_expire: E)
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.stop();
        if initial == 0 {
            on_expire();
            return;
        }

        self.cycle = Some(tokio::spawn(async move {
            let mut countdown = Countdown::new(initial);
            let mut interval = time::interval_at(Instant::now() + PERIOD, PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match countdown.step() {
                    CountdownStep::Ticked { remaining } => on_tick(remaining),
                    CountdownStep::Expired => {
                        on_tick(0);
                        on_expire();
                        break;
                    }
                    CountdownStep::Idle => break,
                }
            }
        }));
    }

    /// Cancel the active cycle, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            cycle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.cycle.as_ref().is_some_and(|cycle| !cycle.is_finished())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Probe {
        ticks: Arc<Mutex<Vec<u32>>>,
        expired: Arc<AtomicUsize>,
    }

    impl Probe {
        fn start(&self, timer: &mut CountdownTimer, seconds: u32) {
            let ticks = Arc::clone(&self.ticks);
            let expired = Arc::clone(&self.expired);
            timer.start(
                seconds,
                move |remaining| ticks.lock().unwrap().push(remaining),
                move || {
                    expired.fetch_add(1, Ordering::SeqCst);
                },
            );
        }

        fn ticks(&self) -> Vec<u32> {
            self.ticks.lock().unwrap().clone()
        }

        fn expired(&self) -> usize {
            self.expired.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_exactly_n_ticks_then_one_expiry() {
        let probe = Probe::default();
        let mut timer = CountdownTimer::new();
        probe.start(&mut timer, 3);

        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(probe.ticks(), vec![2, 1]);
        assert_eq!(probe.expired(), 0);
        assert!(timer.is_running());

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(probe.ticks(), vec![2, 1, 0]);
        assert_eq!(probe.expired(), 1);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_expires_without_ticks() {
        let probe = Probe::default();
        let mut timer = CountdownTimer::new();
        probe.start(&mut timer, 0);

        assert_eq!(probe.expired(), 1);
        time::sleep(Duration::from_secs(3)).await;
        assert!(probe.ticks().is_empty());
        assert_eq!(probe.expired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_silences_the_cycle() {
        let probe = Probe::default();
        let mut timer = CountdownTimer::new();
        probe.start(&mut timer, 5);

        time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        timer.stop();
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(probe.ticks(), vec![4]);
        assert_eq!(probe.expired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_previous_cycle() {
        let first = Probe::default();
        let second = Probe::default();
        let mut timer = CountdownTimer::new();
        first.start(&mut timer, 10);

        time::sleep(Duration::from_millis(2500)).await;
        second.start(&mut timer, 2);
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(first.ticks(), vec![9, 8]);
        assert_eq!(first.expired(), 0);
        assert_eq!(second.ticks(), vec![1, 0]);
        assert_eq!(second.expired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_cycle() {
        let probe = Probe::default();
        {
            let mut timer = CountdownTimer::new();
            probe.start(&mut timer, 3);
        }
        time::sleep(Duration::from_secs(5)).await;
        assert!(probe.ticks().is_empty());
        assert_eq!(probe.expired(), 0);
    }
}
