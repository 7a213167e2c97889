//! Auto-advance timer.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A repeating task that calls `tick` once per period.
///
/// The first tick happens one full period after [`AutoAdvance::start`]. The
/// task is aborted when this handle is dropped, or stops by itself once
/// `tick` returns `ControlFlow::Break`.
#[derive(Debug)]
pub struct AutoAdvance {
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    /// Start the timer on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().is_break() {
                    break;
                }
            }
        });
        Self { handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const PERIOD: Duration = Duration::from_secs(8);

    fn counting(count: &Arc<AtomicUsize>) -> impl FnMut() -> ControlFlow<()> + Send + 'static {
        let count = Arc::clone(count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let _timer = AutoAdvance::start(PERIOD, counting(&count));

        tokio::time::sleep(PERIOD - Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(PERIOD * 2 + Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        let timer = AutoAdvance::start(PERIOD, counting(&count));

        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        drop(timer);
        tokio::time::sleep(PERIOD * 5).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_stops_task() {
        let timer = AutoAdvance::start(PERIOD, || ControlFlow::Break(()));

        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert!(timer.is_finished());
    }
}
