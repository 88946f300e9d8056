use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use levelkeep::application::levels::LevelService;
use levelkeep::cache::{ByteCache, CacheConfig, ItemCache, LruByteCache};
use levelkeep::domain::LevelPayload;
use levelkeep::infra::memory::MemoryLevelStore;
use levelkeep::infra::telemetry;
use metrics_util::debugging::DebuggingRecorder;
use serde_json::json;

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let config = CacheConfig {
        capacity: 2,
        ..Default::default()
    };
    let backend = Arc::new(LruByteCache::new(&config));
    let store = Arc::new(MemoryLevelStore::new());
    let service = LevelService::new(store, ItemCache::new(config, backend.clone()), 100);

    let payload: LevelPayload =
        serde_json::from_value(json!({ "rows": 1 })).expect("payload should decode");
    assert!(service.put_level("a", payload).await.is_success());

    // miss, then hit on the response tier
    assert!(service.get_level("a").await.is_success());
    assert!(service.get_level("a").await.is_success());

    // undecodable entry counts as an error
    backend
        .set("response:/levels/a", Bytes::from_static(b"not json"))
        .await
        .expect("seed corrupt entry");
    assert!(service.get_level("a").await.is_success());

    // capacity of two forces evictions
    assert_eq!(service.get_level("missing").await.status, 404);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "levelkeep_cache_hit_total",
        "levelkeep_cache_miss_total",
        "levelkeep_cache_evict_total",
        "levelkeep_cache_error_total",
        "levelkeep_invalidate_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
