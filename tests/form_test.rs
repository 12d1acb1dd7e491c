mod common;

use common::{FlakyRemote, calls, fields, local_remote};
use lmsadm::{
    error::FormError,
    management::{EntityManager, FieldValue, Paging},
    remote::Remote,
    schema::EntityKind,
    types::{EntityId, Status},
};
use serde_json::json;

#[tokio::test]
async fn test_missing_title_is_rejected_before_any_call() {
    let (_dir, local) = local_remote();
    common::seed_courses(&local, &[("Rust", "published")]).await;
    let remote = FlakyRemote::new(local);
    let counter = remote.calls.clone();

    let mut manager = EntityManager::new(EntityKind::Course, remote, 10);
    manager.refresh().await.unwrap();
    let cache_before = manager.gateway().cache().to_vec();
    let calls_before = calls(&counter);

    manager.open_form(None).unwrap();
    manager.set_field("category", "programming").unwrap();

    match manager.submit().await {
        Err(FormError::Validation { missing }) => assert_eq!(missing, vec!["title"]),
        other => panic!("expected a validation error, got {:?}", other),
    }

    // Nothing was sent and nothing changed; the draft stays open
    assert_eq!(calls(&counter), calls_before);
    assert_eq!(manager.gateway().cache(), cache_before.as_slice());
    assert!(manager.form().is_open());
}

#[tokio::test]
async fn test_whitespace_only_required_field_is_missing() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);

    manager.open_form(None).unwrap();
    manager.set_field("title", "   ").unwrap();
    manager.set_field("category", "art").unwrap();

    assert_eq!(manager.form().missing_required(), vec!["title"]);
}

#[tokio::test]
async fn test_create_maps_person_name_and_default_status() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::User, local, 10);

    manager.open_form(None).unwrap();
    manager.set_field("name", "Ada King Lovelace").unwrap();
    manager.set_field("email", "ada@example.com").unwrap();
    manager.set_field("role", "student").unwrap();
    let user = manager.submit().await.unwrap();

    assert_eq!(user.fields["first_name"], json!("Ada"));
    assert_eq!(user.fields["last_name"], json!("King Lovelace"));
    assert!(!user.fields.contains_key("name"));
    assert_eq!(user.status, Some(Status::Active));

    // Created entity is in the cache and the form is closed
    assert!(manager.gateway().contains(&user.id));
    assert!(!manager.form().is_open());

    // Editing joins the name again
    manager.open_form(Some(&user.id)).unwrap();
    let draft = manager.form().draft().unwrap();
    assert!(!draft.is_new());
    assert_eq!(
        draft.get("name"),
        Some(&FieldValue::Text("Ada King Lovelace".to_string()))
    );
}

#[tokio::test]
async fn test_create_coerces_typed_fields() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);

    manager.open_form(None).unwrap();
    manager.set_field("title", "Rust 101").unwrap();
    manager.set_field("category", "programming").unwrap();
    manager.set_field("tags", "rust, async ,").unwrap();
    manager.set_field("price", "49.90").unwrap();
    manager.set_field("duration_hours", " 12 ").unwrap();
    manager.set_field("featured", "yes").unwrap();
    let course = manager.submit().await.unwrap();

    assert_eq!(course.fields["tags"], json!(["rust", "async"]));
    assert_eq!(course.fields["price"], json!(49.9));
    assert_eq!(course.fields["duration_hours"], json!(12));
    assert_eq!(course.fields["featured"], json!(true));
    assert_eq!(course.status, Some(Status::Draft));
}

#[tokio::test]
async fn test_invalid_input_is_reported_per_field() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);

    // No form open yet
    assert!(matches!(
        manager.set_field("title", "Rust"),
        Err(FormError::NotOpen)
    ));

    manager.open_form(None).unwrap();
    assert!(matches!(
        manager.set_field("price", "cheap"),
        Err(FormError::InvalidValue { .. })
    ));
    assert!(matches!(
        manager.set_field("status", "expired"),
        Err(FormError::InvalidValue { .. })
    ));
    assert!(matches!(
        manager.set_field("colour", "red"),
        Err(FormError::UnknownField(_))
    ));

    // A rejected value leaves the field empty
    assert_eq!(manager.form().draft().unwrap().get("price"), None);
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let (_dir, local) = local_remote();
    let created = local
        .create(
            "courses",
            &fields(json!({
                "title": "Rust",
                "category": "programming",
                "price": 10,
                "tags": ["a", "b"],
            })),
        )
        .await
        .unwrap();
    let remote = FlakyRemote::new(local);
    let sent = remote.sent.clone();

    let mut manager = EntityManager::new(EntityKind::Course, remote, 10);
    manager.refresh().await.unwrap();

    manager.open_form(Some(&created.id)).unwrap();
    manager.set_field("price", "12.5").unwrap();
    let updated = manager.submit().await.unwrap();

    assert_eq!(sent.lock().unwrap().last(), Some(&fields(json!({"price": 12.5}))));
    assert_eq!(updated.fields["price"], json!(12.5));
    assert_eq!(manager.gateway().get(&created.id), Some(&updated));

    // A cleared field is sent as null and removed
    manager.open_form(Some(&created.id)).unwrap();
    manager.set_field("tags", "").unwrap();
    let updated = manager.submit().await.unwrap();

    assert_eq!(sent.lock().unwrap().last(), Some(&fields(json!({"tags": null}))));
    assert!(!updated.fields.contains_key("tags"));
}

#[tokio::test]
async fn test_unchanged_update_makes_no_call() {
    let (_dir, local) = local_remote();
    let ids = common::seed_courses(&local, &[("Rust", "published")]).await;
    let remote = FlakyRemote::new(local);
    let counter = remote.calls.clone();

    let mut manager = EntityManager::new(EntityKind::Course, remote, 10);
    manager.refresh().await.unwrap();
    let before = calls(&counter);

    manager.open_form(Some(&ids[0])).unwrap();
    manager.set_field("title", "Rust").unwrap();
    let entity = manager.submit().await.unwrap();

    assert_eq!(calls(&counter), before);
    assert_eq!(Some(&entity), manager.gateway().get(&ids[0]));
}

#[tokio::test]
async fn test_failed_update_keeps_cache_and_draft() {
    let (_dir, local) = local_remote();
    let ids = common::seed_courses(&local, &[("Rust", "published")]).await;
    let mut manager = EntityManager::new(EntityKind::Course, FlakyRemote::new(local).fail_writes(), 10);
    manager.refresh().await.unwrap();
    let cache_before = manager.gateway().cache().to_vec();

    manager.open_form(Some(&ids[0])).unwrap();
    manager.set_field("title", "Rust, revised").unwrap();

    assert!(matches!(
        manager.submit().await,
        Err(FormError::Gateway(_))
    ));
    assert_eq!(manager.gateway().cache(), cache_before.as_slice());
    assert_eq!(
        manager.form().draft().unwrap().get("title"),
        Some(&FieldValue::Text("Rust, revised".to_string()))
    );
}

#[tokio::test]
async fn test_open_form_requires_cached_entity() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);

    assert!(matches!(
        manager.open_form(Some(&EntityId::from("999"))),
        Err(FormError::UnknownEntity(_))
    ));
    assert!(!manager.form().is_open());
}

#[tokio::test]
async fn test_upload_url_lands_in_field() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);
    manager.open_form(None).unwrap();

    let url = manager
        .attach_upload("thumbnail", "cover.PNG", b"\x89PNG fake".to_vec())
        .await
        .unwrap();

    assert!(url.starts_with("file://"));
    assert!(url.ends_with(".png"));
    assert_eq!(
        manager.form().draft().unwrap().get("thumbnail"),
        Some(&FieldValue::Text(url))
    );

    assert!(matches!(
        manager
            .attach_upload("poster", "cover.png", b"x".to_vec())
            .await,
        Err(FormError::UnknownField(_))
    ));
}

#[tokio::test]
async fn test_cancel_discards_draft() {
    let (_dir, local) = local_remote();
    let mut manager = EntityManager::new(EntityKind::Course, local, 10);

    manager.open_form(None).unwrap();
    manager.set_field("title", "Draft title").unwrap();
    manager.cancel_form();

    assert!(!manager.form().is_open());
    assert!(matches!(manager.submit().await, Err(FormError::NotOpen)));
}

#[tokio::test]
async fn test_numbers_stored_as_text_are_not_resent() {
    let (_dir, local) = local_remote();
    let created = local
        .create(
            "courses",
            &fields(json!({
                "title": "Rust",
                "category": "programming",
                "price": "10",
                "duration_hours": "12",
                "featured": "true",
            })),
        )
        .await
        .unwrap();
    let remote = FlakyRemote::new(local);
    let sent = remote.sent.clone();

    let mut manager = EntityManager::new(EntityKind::Course, remote, 10);
    manager.refresh().await.unwrap();
    manager.open_form(Some(&created.id)).unwrap();
    manager.set_field("title", "Rust 2024").unwrap();
    manager.submit().await.unwrap();

    assert_eq!(
        sent.lock().unwrap().last(),
        Some(&fields(json!({"title": "Rust 2024"})))
    );
}

#[tokio::test]
async fn test_server_view_stays_within_page_after_create() {
    let (_dir, local) = local_remote();
    common::seed_courses(&local, &[("A", "draft"), ("B", "draft")]).await;

    let mut manager = EntityManager::with_paging(EntityKind::Course, local, 2, Paging::Server);
    manager.refresh().await.unwrap();
    assert_eq!(manager.view().len(), 2);

    manager.open_form(None).unwrap();
    manager.set_field("title", "C").unwrap();
    manager.set_field("category", "programming").unwrap();
    let created = manager.submit().await.unwrap();

    // The cache holds the new entity, the view still shows one page
    assert!(manager.gateway().contains(&created.id));
    assert_eq!(manager.view().len(), 2);
}
