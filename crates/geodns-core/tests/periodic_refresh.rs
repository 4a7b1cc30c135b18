//! Reconciliation Contract Test: Periodic Refresh & Timer Lifecycle
//!
//! Constraints verified:
//! - A publish is forced once the refresh interval has elapsed, even with
//!   zero detected changes
//! - Within the interval, an unchanged pool does not re-publish
//! - The timer-driven loop starts immediately, publishes, and shuts down
//!   cleanly on signal

mod common;

use common::*;
use geodns_core::EngineEvent;
use geodns_core::traits::{Member, ServiceState};

fn resolver() -> TableNameResolver {
    TableNameResolver::new(&[("a.example.com", "93.184.216.34")])
}

fn geo_table() -> TableGeoLookup {
    TableGeoLookup::new(&[("93.184.216.34", "London, GB", 51.5, -0.1)])
}

#[tokio::test]
async fn staleness_forces_republish_without_changes() {
    let membership = ControlledMembership::new(vec![
        Member::new("m-a").with_hostname("a.example.com"),
    ]);
    let backend = RecordingBackend::new();
    // zero refresh interval: every poll is past the staleness deadline
    let mut config = test_config(true, false);
    config.engine.refresh_interval_secs = 0;

    let (engine, _events) = build_engine(
        membership,
        backend.clone(),
        resolver(),
        geo_table(),
        config,
    );

    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();

    assert_eq!(backend.reconfigure_count(), 3);
}

#[tokio::test]
async fn fresh_state_suppresses_republish() {
    let membership = ControlledMembership::new(vec![
        Member::new("m-a").with_hostname("a.example.com"),
    ]);
    let backend = RecordingBackend::new();
    // hour-long interval: the second poll is well within it
    let (engine, _events) = build_engine(
        membership,
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );

    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();

    assert_eq!(backend.reconfigure_count(), 1);
}

#[tokio::test]
async fn timer_loop_publishes_and_stops_cleanly() {
    let membership = ControlledMembership::new(vec![
        Member::new("m-a").with_hostname("a.example.com"),
    ]);
    let backend = RecordingBackend::new();
    let (engine, mut events) = build_engine(
        membership,
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );
    let attributes = engine.attributes();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let engine_handle =
        tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // first tick fires immediately; give it a moment to complete
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    assert!(attributes.service_up());
    assert_eq!(attributes.service_state(), ServiceState::Running);
    assert_eq!(attributes.hostname().as_deref(), Some("geo.example.com"));
    assert_eq!(backend.reconfigure_count(), 1);

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    assert_eq!(attributes.service_state(), ServiceState::Stopped);
    assert!(!attributes.service_up());

    let emitted = drain_events(&mut events);
    assert!(emitted.contains(&EngineEvent::Started));
    assert!(emitted
        .iter()
        .any(|e| matches!(e, EngineEvent::Published { target_count: 1 })));
    assert!(emitted
        .iter()
        .any(|e| matches!(e, EngineEvent::Stopped { .. })));
}
