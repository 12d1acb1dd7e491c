use chrono::NaiveDate;
use lmsadm::types::{Entity, ListParams, SortOrder, Status, value_text};
use lmsadm::utils::*;
use serde_json::json;
use std::collections::HashMap;

#[test]
fn test_parse_assignment() {
    assert_eq!(
        parse_assignment("title=Rust 101"),
        Ok(("title".to_string(), "Rust 101".to_string()))
    );

    // Value may be empty or contain '='
    assert_eq!(
        parse_assignment("description="),
        Ok(("description".to_string(), String::new()))
    );
    assert_eq!(
        parse_assignment("url=https://x.test/?a=b"),
        Ok(("url".to_string(), "https://x.test/?a=b".to_string()))
    );

    assert!(parse_assignment("no-equals").is_err());
    assert!(parse_assignment("=value").is_err());
}

#[test]
fn test_split_and_join_person_name() {
    assert_eq!(
        split_person_name("Ada Lovelace"),
        ("Ada".to_string(), "Lovelace".to_string())
    );
    // Everything after the first word is the last name
    assert_eq!(
        split_person_name("  Juan Carlos de la Cruz "),
        ("Juan".to_string(), "Carlos de la Cruz".to_string())
    );
    assert_eq!(split_person_name("Plato"), ("Plato".to_string(), String::new()));

    assert_eq!(join_person_name("Ada", "Lovelace"), "Ada Lovelace");
    assert_eq!(join_person_name("Plato", ""), "Plato");
    assert_eq!(join_person_name("", ""), "");
}

#[test]
fn test_parse_tags() {
    assert_eq!(parse_tags("rust, async ,,web "), vec!["rust", "async", "web"]);
    assert!(parse_tags(" , ").is_empty());
}

#[test]
fn test_parse_bool_and_date() {
    assert_eq!(parse_bool("Yes"), Some(true));
    assert_eq!(parse_bool("off"), Some(false));
    assert_eq!(parse_bool("maybe"), None);

    assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
    assert_eq!(parse_date("2023-02-29"), None);
    assert_eq!(parse_date("29.02.2024"), None);
}

#[test]
fn test_media_file_name_is_content_addressed() {
    let a = media_file_name(b"hello", "Photo.PNG");
    let b = media_file_name(b"hello", "other.png");
    let c = media_file_name(b"world", "Photo.PNG");

    // Same bytes, same name; extension is kept in lower case
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.ends_with(".png"));
    assert!(is_safe_file_name(&a));

    // No extension, no dot
    assert!(!media_file_name(b"hello", "README").contains('.'));
}

#[test]
fn test_sanitize_file_name() {
    assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\Users\\me\\cv.pdf"), "cv.pdf");
    assert_eq!(sanitize_file_name("..."), "upload");
    assert_eq!(sanitize_file_name(".env"), "env");
}

#[test]
fn test_is_safe_file_name() {
    assert!(is_safe_file_name("courses"));
    assert!(is_safe_file_name("abc-DEF_1.png"));
    assert!(!is_safe_file_name(""));
    assert!(!is_safe_file_name(".hidden"));
    assert!(!is_safe_file_name("../courses"));
    assert!(!is_safe_file_name("a/b"));
}

#[test]
fn test_entity_accepts_mongo_style_and_numeric_ids() {
    let mongo: Entity =
        serde_json::from_value(json!({"_id": "65f0a1", "title": "Rust", "status": "Published"}))
            .unwrap();
    assert_eq!(mongo.id.as_str(), "65f0a1");
    assert_eq!(mongo.status, Some(Status::Published));
    assert_eq!(mongo.field_text("title").as_deref(), Some("Rust"));

    let numeric: Entity = serde_json::from_value(json!({"id": 7, "status": null})).unwrap();
    assert_eq!(numeric.id.as_str(), "7");
    assert_eq!(numeric.status, None);
    assert_eq!(numeric.field_text("id").as_deref(), Some("7"));
}

#[test]
fn test_unknown_status_is_kept_verbatim() {
    let status: Status = "processing".parse().unwrap();
    assert_eq!(status, Status::Other("processing".to_string()));
    assert_eq!(status.to_string(), "processing");
}

#[test]
fn test_value_text() {
    assert_eq!(value_text(&json!(null)), None);
    assert_eq!(value_text(&json!(12.5)).as_deref(), Some("12.5"));
    assert_eq!(value_text(&json!(["a", "b"])).as_deref(), Some("a, b"));
    assert_eq!(value_text(&json!(true)).as_deref(), Some("true"));
}

#[test]
fn test_sort_order_parsing() {
    let asc: SortOrder = "price".parse().unwrap();
    assert_eq!(asc.field, "price");
    assert!(!asc.descending);

    let desc: SortOrder = "price:DESC".parse().unwrap();
    assert!(desc.descending);

    assert!("price:sideways".parse::<SortOrder>().is_err());
    assert!(":desc".parse::<SortOrder>().is_err());
}

#[test]
fn test_list_params_query_round_trip() {
    let mut params = ListParams {
        page: Some(2),
        limit: Some(10),
        search: Some("rust".to_string()),
        sort: Some("title:desc".parse().unwrap()),
        ..ListParams::default()
    };
    params
        .filters
        .insert("status".to_string(), "published".to_string());

    let query: HashMap<String, String> = params.to_query().into_iter().collect();
    assert_eq!(query.get("status").map(String::as_str), Some("published"));
    assert_eq!(query.get("order").map(String::as_str), Some("desc"));
    assert_eq!(ListParams::from_query(&query), params);
}

#[test]
fn test_all_params_send_no_paging() {
    assert!(ListParams::all().to_query().is_empty());
}
