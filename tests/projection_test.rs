//! Integration tests for result projection

mod common;

use apm_query_core::config::Config;
use apm_query_core::projection::*;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

fn projector(masking: bool) -> ResultProjector {
    let config = ProjectionConfig {
        masking_enabled: masking,
        ..Default::default()
    };
    ResultProjector::new(
        Arc::new(KeyAliasTable::telemetry_schema()),
        PiiMasker::from_config(&config),
    )
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct PageLoadRow {
    package_name: String,
    user_id: Option<String>,
    duration: i64,
    url: Option<String>,
}

#[test]
fn test_legacy_and_current_documents_project_identically() {
    let legacy = common::raw(json!({
        "pn": "com.shop",
        "st": "android",
        "uid": "u-9f3a21",
        "lc": "cn-sh",
        "url": "https://shop.example/"
    }));
    let current = common::raw(json!({
        "packageName": "com.shop",
        "serverType": "android",
        "userId": "u-9f3a21",
        "locationCode": "cn-sh",
        "url": "https://shop.example/"
    }));

    let projector = projector(true);
    assert_eq!(projector.project(&legacy), projector.project(&current));

    let doc = projector.project(&current);
    assert_eq!(doc.get_str("package_name"), Some("com.shop"));
    assert_eq!(doc.get_str("user_id"), Some("u-******"));
    assert!(doc.get("userId").is_none());
}

#[test]
fn test_conflicting_ct_key_follows_current_schema() {
    let doc = projector(false).project(&common::raw(json!({ "ct": 1_715_000_000_000i64 })));
    assert!(doc.get("client_time").is_some());
    assert!(doc.get("duration").is_none());
}

#[test]
fn test_canonical_key_wins_over_alias() {
    let doc = projector(false).project(&common::raw(json!({
        "user_id": "canonical",
        "uid": "aliased"
    })));
    assert_eq!(doc.get_str("user_id"), Some("canonical"));
    assert_eq!(doc.fields.len(), 1);
}

#[test]
fn test_current_alias_wins_over_legacy_alias() {
    let doc = projector(false).project(&common::raw(json!({
        "uid": "legacy-user",
        "userId": "current-user",
        "costTime": 120,
        "ct": 1_715_000_000_000i64,
        "msg": "old",
        "errorMessage": "new"
    })));

    assert_eq!(doc.get_str("user_id"), Some("current-user"));
    assert_eq!(doc.get_str("message"), Some("new"));
    assert_eq!(doc.get("duration"), Some(&json!(120)));
    assert!(doc.get("client_time").is_some());
}

#[test]
fn test_masking_disabled_passes_through() {
    let doc = projector(false).project(&common::raw(json!({ "userId": "abcdefg" })));
    assert_eq!(doc.get_str("user_id"), Some("abcdefg"));
}

#[test]
fn test_mask_user_id_properties() {
    assert_eq!(mask_user_id(Some("abcdefg"), true, 2).as_deref(), Some("ab*****"));
    assert_eq!(mask_user_id(Some("abcdefg"), false, 2).as_deref(), Some("abcdefg"));
    assert_eq!(mask_user_id(None, true, 2), None);
    assert_eq!(mask_user_id(Some(""), true, 2).as_deref(), Some(""));
    assert_eq!(mask_user_id(Some("a"), true, 2).as_deref(), Some("a"));
}

#[test]
fn test_typed_projection_keeps_convertible_fields() {
    let raw = common::raw(json!({
        "packageName": "com.shop",
        "userId": "abcdefg",
        "costTime": "slow",
        "url": "https://shop.example/"
    }));

    let row: PageLoadRow = projector(true).project_as(&raw);
    assert_eq!(
        row,
        PageLoadRow {
            package_name: "com.shop".to_string(),
            user_id: Some("ab*****".to_string()),
            duration: 0,
            url: Some("https://shop.example/".to_string()),
        }
    );
}

#[test]
fn test_projection_follows_loaded_config() {
    let config = Config::default();
    let masker = PiiMasker::from_config(&config.projection);
    assert!(masker.is_enabled());
    assert!(masker.applies_to("user_id"));
    assert!(!masker.applies_to("package_name"));
}

#[test]
fn test_hit_id_serializes_alongside_fields() {
    let doc = projector(false).project_hit("doc-1", &common::raw(json!({ "pn": "com.shop" })));
    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        json!({ "id": "doc-1", "package_name": "com.shop" })
    );
}
