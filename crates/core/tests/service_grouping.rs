//! Group resolution and bulk-operation aggregation tests, backed by an
//! in-memory definition store and a mock relay.

use std::sync::Arc;

use restream_core::testing::MockRelay;
use restream_core::{
    CreateDefinitionRequest, DefinitionStore, GroupKey, ServiceError, SqliteDefinitionStore,
    StreamOrchestrator, StreamService, UpdateDefinitionRequest,
};

struct Fixture {
    store: Arc<dyn DefinitionStore>,
    relay: Arc<MockRelay>,
    service: StreamService<MockRelay>,
}

fn fixture() -> Fixture {
    let store: Arc<dyn DefinitionStore> = Arc::new(SqliteDefinitionStore::in_memory().unwrap());
    let relay = Arc::new(MockRelay::new());
    let orchestrator = Arc::new(StreamOrchestrator::new(relay.clone(), std::env::temp_dir()));
    let service = StreamService::new(store.clone(), orchestrator);
    Fixture {
        store,
        relay,
        service,
    }
}

fn request(nomination: &str, day: i64, platform: &str) -> CreateDefinitionRequest {
    CreateDefinitionRequest {
        nomination: nomination.to_string(),
        day,
        platform: platform.to_string(),
        platform_url: format!("rtmp://{}.example/live", platform),
        token: Some("key".to_string()),
        source_url: "rtsp://cam1".to_string(),
        active: true,
    }
}

#[tokio::test]
async fn test_start_group_resolves_each_key_kind() {
    let f = fixture();
    f.store.create(request("sprint", 1, "youtube")).unwrap();
    f.store.create(request("sprint", 2, "twitch")).unwrap();
    f.store.create(request("finals", 2, "youtube")).unwrap();

    let by_nomination = f
        .service
        .start_group(&GroupKey::Nomination("sprint".to_string()))
        .await
        .unwrap();
    assert_eq!(by_nomination.requested, 2);
    assert!(by_nomination.all_succeeded());

    f.service.stop_group(&GroupKey::All).await.unwrap();

    let by_day = f.service.start_group(&GroupKey::Day(2)).await.unwrap();
    assert_eq!(by_day.requested, 2);

    f.service.stop_group(&GroupKey::All).await.unwrap();

    let by_platform = f
        .service
        .start_group(&GroupKey::Platform("youtube".to_string()))
        .await
        .unwrap();
    assert_eq!(by_platform.requested, 2);

    f.service.stop_group(&GroupKey::All).await.unwrap();

    let all = f.service.start_group(&GroupKey::All).await.unwrap();
    assert_eq!(all.requested, 3);
    assert_eq!(f.service.list_active().await.len(), 3);
}

#[tokio::test]
async fn test_partial_group_start_reports_failed_ids() {
    let f = fixture();
    let ok = f.store.create(request("finals", 1, "youtube")).unwrap();
    let bad = f.store.create(request("finals", 1, "youtube")).unwrap();
    f.relay.fail_launch(&bad.id, "camera unreachable");

    let outcome = f
        .service
        .start_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.requested, 2);
    assert!(outcome.partial());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].broadcast_id, bad.id);
    assert!(outcome.failures[0].reason.contains("camera unreachable"));

    let active = f.service.list_active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].broadcast_id, ok.id);
}

#[tokio::test]
async fn test_inactive_definitions_skip_group_start_but_not_group_stop() {
    let f = fixture();
    let def = f.store.create(request("finals", 1, "youtube")).unwrap();
    f.store.create(request("finals", 1, "twitch")).unwrap();

    let outcome = f
        .service
        .start_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.requested, 2);

    // Deactivating a definition must not orphan its running broadcast.
    f.store
        .update(
            &def.id,
            UpdateDefinitionRequest {
                active: Some(false),
                token: None,
            },
        )
        .unwrap();

    let stopped = f
        .service
        .stop_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();
    assert_eq!(stopped.requested, 2);
    assert!(stopped.all_succeeded());
    assert!(f.service.list_active().await.is_empty());

    // Once inactive, the definition no longer takes part in group starts.
    let restart = f
        .service
        .start_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();
    assert_eq!(restart.requested, 1);
}

#[tokio::test]
async fn test_unknown_group_fails_at_start_and_passes_at_stop() {
    let f = fixture();
    let key = GroupKey::Nomination("nomination-5".to_string());

    let err = f.service.start_group(&key).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "no broadcast definitions for nomination nomination-5"
    );
    assert!(matches!(err, ServiceError::GroupNotFound(_)));

    let outcome = f.service.stop_group(&key).await.unwrap();
    assert_eq!(outcome.requested, 0);
    assert!(outcome.all_succeeded());
}

#[tokio::test]
async fn test_single_broadcast_start_and_stop() {
    let f = fixture();
    let def = f.store.create(request("finals", 1, "youtube")).unwrap();

    let active = f.service.start_broadcast(&def.id).await.unwrap();
    assert_eq!(active.broadcast_id, def.id);
    assert_eq!(active.nomination, "finals");
    assert_eq!(active.destination_url, "rtmp://youtube.example/live/key");

    assert!(f.service.stop_broadcast(&def.id).await.unwrap());
    assert!(!f.service.stop_broadcast(&def.id).await.unwrap());
    assert_eq!(f.relay.killed(), vec![def.id.clone()]);
}

#[tokio::test]
async fn test_group_stop_failure_is_aggregated_not_fatal() {
    let f = fixture();
    let good = f.store.create(request("finals", 1, "youtube")).unwrap();
    let wedged = f.store.create(request("finals", 1, "twitch")).unwrap();
    f.relay.fail_kill(&wedged.id, "process wedged");

    f.service
        .start_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();

    let outcome = f
        .service
        .stop_group(&GroupKey::Nomination("finals".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome.requested, 2);
    assert!(outcome.partial());
    assert_eq!(outcome.failures[0].broadcast_id, wedged.id);
    assert!(f.service.list_active().await.is_empty());
    assert_eq!(f.relay.killed(), vec![good.id]);
}
