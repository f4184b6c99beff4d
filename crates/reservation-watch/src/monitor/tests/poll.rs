use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::monitor::{CheckOutcome, PollSummary};
use crate::store::{InMemoryMonitoringStore, MonitoringStore};

#[tokio::test]
async fn notified_requests_are_deactivated_and_never_notified_again() {
    let store = Arc::new(InMemoryMonitoringStore::new());
    let checker = Arc::new(ScriptedChecker::default().with_dates("May", &["May 3–4"]));
    let gateway = Arc::new(RecordingGateway::default());
    let monitor = monitor(&store, &checker, &gateway);
    let request = seed(&store, "jo@example.com", "May").await;

    let first = monitor.poll_once().await;
    let second = monitor.poll_once().await;

    assert_eq!(first.notified, 1);
    assert_eq!(second, PollSummary::default());
    assert_eq!(gateway.sent().len(), 1);
    let stored = store.snapshot().expect("snapshot");
    assert_eq!(stored[0].id, request.id);
    assert!(!stored[0].active);
}

#[tokio::test]
async fn a_failing_check_does_not_stop_the_tick() {
    let store = Arc::new(InMemoryMonitoringStore::new());
    let checker = Arc::new(
        ScriptedChecker::default()
            .failing_for("June")
            .with_dates("May", &["May 10"]),
    );
    let gateway = Arc::new(RecordingGateway::default());
    let monitor = monitor(&store, &checker, &gateway);
    seed(&store, "a@example.com", "June").await;
    seed(&store, "b@example.com", "May").await;
    seed(&store, "c@example.com", "July").await;

    let summary = monitor.poll_once().await;

    assert_eq!(
        summary,
        PollSummary {
            examined: 3,
            notified: 1,
            notification_failures: 0,
            no_match: 1,
            failed: 1,
        }
    );
    assert_eq!(checker.calls(), vec!["June", "May", "July"]);
    let active = store.list_active().await.expect("list");
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|request| request.month != "May"));
}

#[tokio::test]
async fn failed_notification_keeps_request_active_until_delivery_succeeds() {
    let store = Arc::new(InMemoryMonitoringStore::new());
    let checker = Arc::new(ScriptedChecker::default().with_dates("August", &["August 1–3"]));
    let gateway = Arc::new(RecordingGateway::rejecting());
    let monitor = monitor(&store, &checker, &gateway);
    seed(&store, "jo@example.com", "August").await;

    let summary = monitor.poll_once().await;
    assert_eq!(summary.notification_failures, 1);
    assert_eq!(store.list_active().await.expect("list").len(), 1);

    gateway.set_rejecting(false);
    let summary = monitor.poll_once().await;
    assert_eq!(summary.notified, 1);
    assert!(store.list_active().await.expect("list").is_empty());
}

#[tokio::test]
async fn failed_deactivation_is_counted_and_later_records_still_run() {
    let store = Arc::new(ReadOnlyStore::default());
    let checker = Arc::new(
        ScriptedChecker::default()
            .with_dates("May", &["May 3"])
            .with_dates("June", &["June 7–8"]),
    );
    let gateway = Arc::new(RecordingGateway::default());
    let monitor = monitor(&store, &checker, &gateway);
    seed(store.inner(), "a@example.com", "May").await;
    seed(store.inner(), "b@example.com", "June").await;
    seed(store.inner(), "c@example.com", "July").await;

    let summary = monitor.poll_once().await;

    assert_eq!(
        summary,
        PollSummary {
            examined: 3,
            notified: 0,
            notification_failures: 0,
            no_match: 1,
            failed: 2,
        }
    );
    assert_eq!(checker.calls(), vec!["May", "June", "July"]);
    assert_eq!(gateway.sent().len(), 2);
    assert_eq!(store.list_active().await.expect("list").len(), 3);
}

#[tokio::test]
async fn store_failure_yields_an_empty_summary() {
    let store = Arc::new(UnavailableStore);
    let checker = Arc::new(ScriptedChecker::default());
    let gateway = Arc::new(RecordingGateway::default());

    let summary = monitor(&store, &checker, &gateway).poll_once().await;

    assert_eq!(summary, PollSummary::default());
    assert!(checker.calls().is_empty());
}

#[tokio::test]
async fn inactive_records_are_skipped_without_checking() {
    let store = Arc::new(InMemoryMonitoringStore::new());
    let checker = Arc::new(ScriptedChecker::default().with_dates("May", &["May 3"]));
    let gateway = Arc::new(RecordingGateway::default());
    let monitor = monitor(&store, &checker, &gateway);
    let mut request = seed(&store, "jo@example.com", "May").await;
    request.active = false;

    let outcome = monitor.check_request(&request).await.expect("check");

    assert_eq!(outcome, CheckOutcome::Skipped);
    assert!(checker.calls().is_empty());
    assert!(gateway.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_waits_one_interval_before_the_first_poll() {
    let store = Arc::new(InMemoryMonitoringStore::new());
    let checker = Arc::new(ScriptedChecker::default());
    let gateway = Arc::new(RecordingGateway::default());
    let monitor = Arc::new(monitor(&store, &checker, &gateway));
    seed(&store, "jo@example.com", "May").await;

    let handle = monitor.spawn(Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(checker.calls().is_empty());

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(checker.calls(), vec!["May"]);

    checker.set_dates("May", &["May 20"]);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(gateway.sent().len(), 1);
    assert!(store.list_active().await.expect("list").is_empty());

    handle.abort();
}
