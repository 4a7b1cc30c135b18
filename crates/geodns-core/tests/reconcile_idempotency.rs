//! Reconciliation Contract Test: Idempotency
//!
//! Constraints verified:
//! - An unchanged pool with unchanged attributes never re-publishes
//! - A changed published address re-publishes exactly once
//! - Attribute churn that does not change the published address is ignored
//!
//! If these fail, change detection is broken and the engine will hammer the
//! DNS backend on every poll.

mod common;

use common::*;
use geodns_core::geo::Coordinates;
use geodns_core::traits::{Member, MemberId};

fn fixtures() -> (ControlledMembership, RecordingBackend) {
    let membership = ControlledMembership::new(vec![
        Member::new("m-a").with_hostname("a.example.com"),
    ]);
    (membership, RecordingBackend::new())
}

fn resolver() -> TableNameResolver {
    TableNameResolver::new(&[
        ("a.example.com", "93.184.216.34"),
        ("b.example.com", "198.51.100.7"),
    ])
}

fn geo_table() -> TableGeoLookup {
    TableGeoLookup::new(&[
        ("93.184.216.34", "London, GB", 51.5, -0.1),
        ("198.51.100.7", "Dublin, IE", 53.3, -6.3),
    ])
}

#[tokio::test]
async fn unchanged_pool_publishes_once() {
    let (membership, backend) = fixtures();
    let (engine, _events) = build_engine(
        membership.clone(),
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );

    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();
    engine.poll_once().await.unwrap();

    // first poll publishes the initial set; nothing after that
    assert_eq!(backend.reconfigure_count(), 1);
    assert_eq!(engine.targets().len(), 1);
    assert_eq!(membership.rescan_count(), 3);
}

#[tokio::test]
async fn changed_address_republishes() {
    let (membership, backend) = fixtures();
    let (engine, _events) = build_engine(
        membership.clone(),
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );

    engine.poll_once().await.unwrap();
    assert_eq!(backend.reconfigure_count(), 1);

    // hostname attribute changes between polls
    membership.set_pool(vec![Member::new("m-a").with_hostname("b.example.com")]);
    engine.poll_once().await.unwrap();

    assert_eq!(backend.reconfigure_count(), 2);
    let published = backend.last_targets().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].address, "b.example.com");
    assert_eq!(published[0].latitude, 53.3);

    // and it settles again
    engine.poll_once().await.unwrap();
    assert_eq!(backend.reconfigure_count(), 2);
}

#[tokio::test]
async fn attribute_churn_without_address_change_is_quiet() {
    let (membership, backend) = fixtures();
    let (engine, _events) = build_engine(
        membership.clone(),
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );

    engine.poll_once().await.unwrap();
    assert_eq!(backend.reconfigure_count(), 1);

    // declared coordinates appear, but the published address is unchanged
    membership.set_pool(vec![
        Member::new("m-a")
            .with_hostname("a.example.com")
            .with_declared_coordinates(Coordinates::new(51.5, -0.1)),
    ]);
    engine.poll_once().await.unwrap();

    assert_eq!(backend.reconfigure_count(), 1);
}

#[tokio::test]
async fn published_attributes_reflect_target_set() {
    let (membership, backend) = fixtures();
    let (engine, _events) = build_engine(
        membership.clone(),
        backend.clone(),
        resolver(),
        geo_table(),
        test_config(true, false),
    );

    engine.poll_once().await.unwrap();

    let attributes = engine.attributes();
    let targets = attributes.targets();
    assert_eq!(
        targets,
        vec![(MemberId::new("m-a"), "a.example.com".to_string())]
    );
    assert!(attributes.last_publish().is_some());
}
