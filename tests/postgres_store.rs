//! Postgres level store behaviour. Requires `DATABASE_URL`; run with
//! `--ignored`.

use std::sync::Arc;

use levelkeep::application::levels::LevelService;
use levelkeep::application::repos::{LevelStore, RepoError};
use levelkeep::cache::{CacheConfig, ItemCache, LruByteCache};
use levelkeep::domain::{Field, Level, LevelPayload};
use levelkeep::infra::db::PostgresLevelStore;
use serde_json::json;
use sqlx::PgPool;

fn level(id: &str, body: serde_json::Value) -> Level {
    let payload: LevelPayload = serde_json::from_value(body).expect("payload should decode");
    Level::from_payload(id, payload).expect("valid level")
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn put_get_delete_roundtrip(pool: PgPool) {
    let store = PostgresLevelStore::new(pool, "LevelRoot");

    let stored = level(
        "a",
        json!({ "name": "First", "rows": 0, "spawn_frequency": { "grunt": 0.25 } }),
    );
    store.put(&stored).await.expect("put");

    let loaded = store.get("a").await.expect("get").expect("present");
    assert_eq!(loaded, stored);
    assert_eq!(loaded.fields.rows, Field::Set(0));
    assert!(loaded.fields.columns.is_unset());

    store
        .put(&level("a", json!({ "parent_key": "p" })))
        .await
        .expect("replace");
    let replaced = store.get("a").await.expect("get").expect("present");
    assert_eq!(replaced.parent_id(), Some("p"));
    assert!(replaced.fields.name.is_unset());

    store.delete("a").await.expect("delete");
    store.delete("a").await.expect("delete missing");
    assert!(store.get("a").await.expect("get").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn queries_are_scoped_to_collection_root(pool: PgPool) {
    let main = PostgresLevelStore::new(pool.clone(), "LevelRoot");
    let staging = PostgresLevelStore::new(pool, "Staging");

    for (id, body) in [
        ("p", json!({})),
        ("c2", json!({ "parent_key": "p" })),
        ("c1", json!({ "parent_key": "p" })),
    ] {
        main.put(&level(id, body)).await.expect("put");
    }
    staging
        .put(&level("c3", json!({ "parent_key": "p" })))
        .await
        .expect("put");

    assert_eq!(
        main.query_children("p").await.expect("children"),
        vec!["c1", "c2"]
    );
    assert_eq!(main.query_all(2).await.expect("all"), vec!["c1", "c2"]);
    assert_eq!(staging.query_all(100).await.expect("all"), vec!["c3"]);
    assert!(staging.get("p").await.expect("get").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn malformed_body_is_a_store_error(pool: PgPool) {
    sqlx::query(
        "INSERT INTO levels (root, id, parent_id, body) VALUES ('LevelRoot', 'bad', NULL, $1)",
    )
    .bind(sqlx::types::Json(json!({ "rows": "many" })))
    .execute(&pool)
    .await
    .expect("insert raw row");

    let store = PostgresLevelStore::new(pool, "LevelRoot");
    let err = store.get("bad").await.expect_err("malformed body");
    assert!(matches!(err, RepoError::Malformed { ref id, .. } if id == "bad"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a Postgres database"]
async fn service_inherits_through_postgres(pool: PgPool) {
    let store = Arc::new(PostgresLevelStore::new(pool, "LevelRoot"));
    let config = CacheConfig::default();
    let backend = Arc::new(LruByteCache::new(&config));
    let service = LevelService::new(store, ItemCache::new(config, backend), 100);

    for (id, body) in [
        ("A", json!({ "rows": 1, "columns": 2 })),
        ("B", json!({ "parent_key": "A", "name": "child" })),
    ] {
        let payload: LevelPayload = serde_json::from_value(body).expect("payload");
        assert!(service.put_level(id, payload).await.is_success());
    }
    assert_eq!(service.get_level("B").await.body["rows"], json!(1));

    let payload: LevelPayload =
        serde_json::from_value(json!({ "rows": 5, "columns": 2 })).expect("payload");
    assert!(service.put_level("A", payload).await.is_success());
    assert_eq!(service.get_level("B").await.body["rows"], json!(5));
}
