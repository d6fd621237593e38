mod common;

use cartpilot_engine::poller::{BoundedPoller, poll_until};
use common::LogCapture;
use std::cell::Cell;
use std::time::Duration;
use tokio::time::Instant;

const SECOND: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn test_returns_true_once_predicate_holds() {
    let start = Instant::now();
    let ready_at = Duration::from_secs(3);

    let ok = poll_until(
        || async move { Ok::<_, String>(start.elapsed() >= ready_at) },
        Duration::from_secs(10),
        SECOND,
    )
    .await;

    assert!(ok);
    assert!(start.elapsed() >= ready_at);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_returns_false_at_budget_not_before() {
    let start = Instant::now();
    let ok = poll_until(
        || async { Ok::<_, String>(false) },
        Duration::from_secs(10),
        SECOND,
    )
    .await;

    assert!(!ok);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_budget_not_multiple_of_interval() {
    let start = Instant::now();
    let outcome = BoundedPoller::new(Duration::from_millis(2500), SECOND)
        .poll("odd budget", || async { Ok::<_, String>(false) })
        .await;

    assert!(!outcome.satisfied());
    assert_eq!(outcome.attempts, 3);
    assert_eq!(start.elapsed(), Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn test_errors_count_as_not_yet() {
    let calls = Cell::new(0);
    let outcome = BoundedPoller::new(Duration::from_secs(10), SECOND)
        .poll("flaky", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n <= 3 {
                    Err(format!("stale element on call {}", n))
                } else {
                    Ok(true)
                }
            }
        })
        .await;

    assert!(outcome.satisfied());
    assert_eq!(outcome.attempts, 4);
    assert_eq!(outcome.elapsed, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_errors_until_budget_returns_false() {
    let ok = BoundedPoller::new(Duration::from_secs(5), SECOND)
        .poll_until("always failing", || async { Err::<bool, _>("boom") })
        .await;
    assert!(!ok);
}

#[tokio::test(start_paused = true)]
async fn test_two_minutes_at_one_second_is_120_attempts() {
    let outcome = BoundedPoller::new(Duration::from_secs(120), SECOND)
        .poll("OTP verification", || async { Ok::<_, String>(false) })
        .await;

    assert_eq!(outcome.attempts, 120);
    assert_eq!(outcome.elapsed, Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn test_poll_for_returns_value() {
    let calls = Cell::new(0u32);
    let outcome = BoundedPoller::with_budget(Duration::from_secs(5))
        .poll_for("value", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok::<_, String>((n == 2).then_some("found")) }
        })
        .await;

    assert_eq!(outcome.value, Some("found"));
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_reported() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    BoundedPoller::new(Duration::from_secs(30), SECOND)
        .progress_every(10)
        .poll_until("OTP verification", || async { Ok::<_, String>(false) })
        .await;

    assert_eq!(logs.count("still waiting"), 3);
    assert_eq!(logs.count(": still waiting... 21 seconds remaining"), 1);
    assert_eq!(logs.count(": still waiting... 11 seconds remaining"), 1);
    assert_eq!(logs.count(": still waiting... 1 seconds remaining"), 1);
}
