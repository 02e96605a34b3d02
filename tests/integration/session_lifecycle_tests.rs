//! Session state machine lifecycle tests: idempotency, rollback, and
//! bounded escalation, driven through a scripted launcher.

use std::time::Instant;

use serial_test::serial;

use fleetrec::recorder::session::StatusToken;

use super::test_helpers::{mock_manager, LaunchPlan};

/// Calling `start()` twice without a `stop()` spawns exactly one pair; the
/// second call is a no-op returning the existing status.
#[tokio::test]
async fn start_is_idempotent() {
    let (manager, launcher) = mock_manager(LaunchPlan::Graceful, LaunchPlan::Graceful);

    assert_eq!(manager.start().await, StatusToken::Running);
    assert_eq!(manager.start().await, StatusToken::Running);
    assert_eq!(launcher.launches(), 2, "second start must not spawn again");

    manager.stop().await;
}

/// Two concurrent starts race for the session lock; only one spawns.
#[tokio::test]
async fn concurrent_starts_spawn_one_pair() {
    let (manager, launcher) = mock_manager(LaunchPlan::Graceful, LaunchPlan::Graceful);

    let (first, second) = tokio::join!(manager.start(), manager.start());
    assert_eq!(first, StatusToken::Running);
    assert_eq!(second, StatusToken::Running);
    assert_eq!(launcher.launches(), 2);

    manager.stop().await;
}

/// Stopping an idle session is a no-op with no side effects.
#[tokio::test]
async fn stop_on_idle_is_noop() {
    let (manager, launcher) = mock_manager(LaunchPlan::Graceful, LaunchPlan::Graceful);

    assert_eq!(manager.stop().await, StatusToken::Stopped);
    assert_eq!(manager.status().await, StatusToken::Idle);
    assert_eq!(launcher.launches(), 0);
}

/// start → status reports Running; stop → status reports Idle.
#[tokio::test]
async fn round_trip_status() {
    let (manager, _launcher) = mock_manager(LaunchPlan::Graceful, LaunchPlan::Graceful);

    assert_eq!(manager.start().await, StatusToken::Running);
    assert_eq!(manager.status().await, StatusToken::Running);
    assert_eq!(manager.stop().await, StatusToken::Stopped);
    assert_eq!(manager.status().await, StatusToken::Idle);
}

/// If the second leg fails to launch, the first is torn down and the
/// session reports Idle — never a dangling single process.
#[tokio::test]
async fn rollback_when_webcam_fails_to_launch() {
    let (manager, launcher) = mock_manager(LaunchPlan::Graceful, LaunchPlan::FailSpawn);

    assert_eq!(manager.start().await, StatusToken::Idle);
    assert_eq!(manager.status().await, StatusToken::Idle);
    assert_eq!(launcher.launches(), 2, "both legs were attempted");

    // The session must be startable again after rollback.
    assert_eq!(manager.stop().await, StatusToken::Stopped);
}

/// A capture that dies during the post-launch probe fails the start and
/// rolls the pair back.
#[tokio::test]
async fn rollback_when_capture_dies_during_probe() {
    let (manager, _launcher) = mock_manager(LaunchPlan::DiesInstantly, LaunchPlan::Graceful);

    assert_eq!(manager.start().await, StatusToken::Idle);
    assert_eq!(manager.status().await, StatusToken::Idle);
}

/// A process that ignores the stop token is force-terminated; `stop()`
/// still completes within the combined deadlines and lands on Idle.
#[tokio::test]
#[serial]
async fn stop_escalates_to_forced_termination() {
    let (manager, _launcher) = mock_manager(LaunchPlan::Stubborn, LaunchPlan::Stubborn);

    assert_eq!(manager.start().await, StatusToken::Running);

    let begun = Instant::now();
    assert_eq!(manager.stop().await, StatusToken::Stopped);
    let elapsed = begun.elapsed();

    // 1s graceful + 2s kill per leg is the ceiling; SIGKILL lands almost
    // immediately, so well under the combined worst case.
    assert!(
        elapsed.as_secs_f64() < 5.0,
        "stop took {elapsed:?}, expected bounded escalation"
    );
    assert_eq!(manager.status().await, StatusToken::Idle);
}
