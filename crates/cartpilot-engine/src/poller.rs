//! Bounded polling: "wait until the predicate holds, or the budget runs out".
//!
//! Used for page-state waits, per-locator actionability waits and the
//! human-in-the-loop one-time-code wait. A failing predicate evaluation is
//! logged and counted as "not yet"; polling never raises.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Smallest interval accepted; a zero interval would spin without yielding.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Result of one poll session.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome<T> {
    pub value: Option<T>,
    pub attempts: usize,
    pub elapsed: Duration,
}

impl<T> PollOutcome<T> {
    pub fn satisfied(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BoundedPoller {
    max_duration: Duration,
    interval: Duration,
    progress_every: Option<usize>,
}

impl BoundedPoller {
    pub fn new(max_duration: Duration, interval: Duration) -> Self {
        Self {
            max_duration,
            interval: interval.max(MIN_INTERVAL),
            progress_every: None,
        }
    }

    /// Poller with the default one second interval.
    pub fn with_budget(max_duration: Duration) -> Self {
        Self::new(max_duration, Duration::from_secs(1))
    }

    /// Log the remaining budget every `attempts` evaluations.
    pub fn progress_every(mut self, attempts: usize) -> Self {
        self.progress_every = (attempts > 0).then_some(attempts);
        self
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Evaluate `probe` until it yields a value or the budget is exhausted.
    ///
    /// The last sleep is clamped to the deadline, so an unsatisfied session
    /// returns at `max_duration` and not before. A zero budget evaluates once.
    pub async fn poll_for<T, E, F, Fut>(&self, label: &str, mut probe: F) -> PollOutcome<T>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let start = Instant::now();
        let deadline = start + self.max_duration;
        let mut attempts = 0;

        loop {
            attempts += 1;
            match probe().await {
                Ok(Some(value)) => {
                    debug!("{}: satisfied after {} attempt(s)", label, attempts);
                    return PollOutcome {
                        value: Some(value),
                        attempts,
                        elapsed: start.elapsed(),
                    };
                }
                Ok(None) => {}
                Err(e) => warn!("{}: attempt {} failed: {}", label, attempts, e),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            if let Some(every) = self.progress_every
                && attempts % every == 0
            {
                info!(
                    "{}: still waiting... {} seconds remaining",
                    label,
                    (deadline - now).as_secs()
                );
            }

            let next = now + self.interval;
            if next >= deadline {
                sleep_until(deadline).await;
                break;
            }
            sleep_until(next).await;
        }

        debug!("{}: budget exhausted after {} attempt(s)", label, attempts);
        PollOutcome {
            value: None,
            attempts,
            elapsed: start.elapsed(),
        }
    }

    /// Evaluate a boolean predicate until it returns `true`.
    pub async fn poll<E, F, Fut>(&self, label: &str, mut predicate: F) -> PollOutcome<()>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        self.poll_for(label, || {
            let fut = predicate();
            async move { fut.await.map(|ok| ok.then_some(())) }
        })
        .await
    }

    pub async fn poll_until<E, F, Fut>(&self, label: &str, predicate: F) -> bool
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        self.poll(label, predicate).await.satisfied()
    }
}

/// One-off poll with a fresh [`BoundedPoller`].
pub async fn poll_until<E, F, Fut>(predicate: F, max_duration: Duration, interval: Duration) -> bool
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    BoundedPoller::new(max_duration, interval)
        .poll_until("poll", predicate)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_is_clamped() {
        let p = BoundedPoller::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(p.interval(), MIN_INTERVAL);
    }

    #[test]
    fn test_progress_zero_disables() {
        let p = BoundedPoller::with_budget(Duration::from_secs(5)).progress_every(0);
        assert!(p.progress_every.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_evaluates_once() {
        let mut calls = 0;
        let p = BoundedPoller::new(Duration::ZERO, Duration::from_millis(500));
        let ok = p
            .poll_until("once", || {
                calls += 1;
                async { Ok::<_, String>(false) }
            })
            .await;
        assert!(!ok);
        assert_eq!(calls, 1);
    }
}
