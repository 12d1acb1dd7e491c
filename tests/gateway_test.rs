mod common;

use common::{FlakyRemote, fields, local_remote};
use lmsadm::{
    error::GatewayError,
    management::DataGateway,
    remote::{LocalRemote, Remote},
    types::{EntityId, ListParams},
};
use serde_json::json;

fn course_payload(title: &str) -> lmsadm::types::Fields {
    fields(json!({"title": title, "category": "programming"}))
}

#[tokio::test]
async fn test_create_then_list_yields_fresh_unique_id() {
    let (_dir, local) = local_remote();
    let mut gateway = DataGateway::new("courses", local);

    let first = gateway.create(&course_payload("Rust")).await.unwrap();
    let second = gateway.create(&course_payload("Go")).await.unwrap();
    assert_ne!(first.id, second.id);

    let page = gateway.list(&ListParams::all()).await.unwrap();
    let ids: Vec<&EntityId> = page.items.iter().map(|e| &e.id).collect();
    assert_eq!(ids, vec![&first.id, &second.id]);
    assert_eq!(gateway.cache().len(), 2);
}

#[tokio::test]
async fn test_client_ids_are_ignored_on_create() {
    let (_dir, local) = local_remote();
    let mut gateway = DataGateway::new("courses", local);

    let mut payload = course_payload("Rust");
    payload.insert("id".to_string(), json!("1"));
    gateway.create(&payload).await.unwrap();
    let second = gateway.create(&payload).await.unwrap();

    assert_eq!(second.id, EntityId::from("2"));
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let (_dir, local) = local_remote();
    let mut gateway = DataGateway::new("courses", local);

    let first = gateway.create(&course_payload("Rust")).await.unwrap();
    gateway.delete(&first.id).await.unwrap();
    let second = gateway.create(&course_payload("Go")).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_delete_then_list_and_repeat_delete() {
    let (_dir, local) = local_remote();
    let mut gateway = DataGateway::new("courses", local);
    let course = gateway.create(&course_payload("Rust")).await.unwrap();

    gateway.delete(&course.id).await.unwrap();
    let page = gateway.list(&ListParams::all()).await.unwrap();
    assert!(page.items.iter().all(|e| e.id != course.id));

    // Second delete of the same id is harmless
    assert!(gateway.delete(&course.id).await.is_ok());
}

#[tokio::test]
async fn test_failures_leave_cache_untouched() {
    let (_dir, local) = local_remote();
    common::seed_courses(&local, &[("Rust", "draft")]).await;

    let mut gateway = DataGateway::new("courses", FlakyRemote::new(local).fail_writes());
    gateway.list(&ListParams::all()).await.unwrap();
    let before = gateway.cache().to_vec();
    let id = before[0].id.clone();

    assert!(gateway.create(&course_payload("Go")).await.is_err());
    assert!(gateway.update(&id, &course_payload("Rust 2")).await.is_err());
    assert!(matches!(
        gateway.delete(&id).await,
        Err(GatewayError::Status(503))
    ));

    assert_eq!(gateway.cache(), before.as_slice());
}

#[tokio::test]
async fn test_missing_required_field_is_rejected_by_store() {
    let (_dir, local) = local_remote();
    let mut gateway = DataGateway::new("courses", local);

    let result = gateway.create(&fields(json!({"category": "art"}))).await;

    match result {
        Err(GatewayError::Rejected(message)) => assert!(message.contains("title")),
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert!(gateway.cache().is_empty());
}

#[tokio::test]
async fn test_fetch_and_update_patch_cache() {
    let (_dir, local) = local_remote();
    let ids = common::seed_courses(&local, &[("Rust", "draft"), ("Go", "draft")]).await;
    let mut gateway = DataGateway::new("courses", local);

    let fetched = gateway.fetch(&ids[1]).await.unwrap();
    assert_eq!(gateway.cache(), &[fetched]);

    let updated = gateway
        .update(&ids[1], &fields(json!({"status": "published", "price": 5})))
        .await
        .unwrap();
    assert_eq!(gateway.cache().len(), 1);
    assert_eq!(gateway.get(&ids[1]), Some(&updated));
    assert_eq!(updated.fields["title"], json!("Go"));

    assert!(matches!(
        gateway.fetch(&EntityId::from("99")).await,
        Err(GatewayError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_server_side_paging_of_local_store() {
    let (_dir, local) = local_remote();
    common::seed_courses(
        &local,
        &[("A", "draft"), ("B", "published"), ("C", "published"), ("D", "published")],
    )
    .await;
    let mut gateway = DataGateway::new("courses", local);

    let mut params = ListParams {
        page: Some(2),
        limit: Some(2),
        ..ListParams::default()
    };
    params
        .filters
        .insert("status".to_string(), "published".to_string());
    let page = gateway.list(&params).await.unwrap();

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].field_text("title").as_deref(), Some("D"));
    assert_eq!(gateway.total_pages(), 2);
}

#[tokio::test]
async fn test_store_persists_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let created = {
        let remote = LocalRemote::open(dir.path());
        remote
            .create("courses", &course_payload("Rust"))
            .await
            .unwrap()
    };

    let reopened = LocalRemote::open(dir.path());
    let entity = reopened.fetch("courses", &created.id).await.unwrap();
    assert_eq!(entity, created);
    assert!(reopened.is_local());
}

#[tokio::test]
async fn test_failed_write_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let remote = LocalRemote::open(dir.path());
    let rust = remote
        .create("courses", &course_payload("Rust"))
        .await
        .unwrap();

    // A plain file where the store directory should be makes every write fail
    let store_dir = dir.path().join("store");
    std::fs::remove_dir_all(&store_dir).unwrap();
    std::fs::write(&store_dir, "not a directory").unwrap();

    assert!(matches!(
        remote.create("courses", &course_payload("Go")).await,
        Err(GatewayError::Store(_))
    ));
    assert!(matches!(
        remote
            .update("courses", &rust.id, &course_payload("Rust 2"))
            .await,
        Err(GatewayError::Store(_))
    ));
    assert!(matches!(
        remote.delete("courses", &rust.id).await,
        Err(GatewayError::Store(_))
    ));

    // Nothing of the failed writes is visible
    let page = remote.list("courses", &ListParams::all()).await.unwrap();
    assert_eq!(page.items, vec![rust.clone()]);

    // The id handed out by the failed create is not burnt
    std::fs::remove_file(&store_dir).unwrap();
    let go = remote
        .create("courses", &course_payload("Go"))
        .await
        .unwrap();
    assert_eq!(go.id, EntityId::from("2"));
}
