//! End-to-end mounts against fixture files.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::{io::Write, time::Duration};

use nostrframe_app::{RegistryError, ViewBody};
use nostrframe_cli::{CliError, Fixtures, MountOptions, mount};
use nostrframe_core::{Entity, Status};

const PUBKEY: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

fn fixture_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn post_fixtures(event_id: &str) -> String {
    format!(
        r#"{{
            "events": [{{
                "id": "{event_id}",
                "pubkey": "{PUBKEY}",
                "kind": 1,
                "created_at": 1700000000,
                "content": "gm"
            }}],
            "profiles": {{
                "{PUBKEY}": {{ "pubkey": "{PUBKEY}", "display_name": "Fiatjaf" }}
            }}
        }}"#
    )
}

fn options(element: &str, attributes: &[(&str, &str)]) -> MountOptions {
    MountOptions {
        element: element.to_string(),
        attributes: attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        settle: Duration::from_millis(20),
    }
}

#[tokio::test]
async fn post_resolves_from_fixture_file() {
    let id = "e".repeat(64);
    let file = fixture_file(&post_fixtures(&id));
    let fixtures = Fixtures::load(file.path()).unwrap();

    let report = mount(&options("nostr-post", &[("event-id", id.as_str())]), fixtures).await.unwrap();

    assert_eq!(report.status, Status::Ready);
    assert_eq!(report.presentation, Some("is-clickable"));
    assert_eq!(report.attributes.get("event-status").map(String::as_str), Some("ready"));
    assert_eq!(report.attributes.get("author-status").map(String::as_str), Some("ready"));
    assert!(report.events.iter().any(|e| e.name == "nc:ready"));

    let Some(ViewBody::Ready { entity: Some(Entity::Event(event)), author: Some(author) }) =
        report.view.map(|view| view.body)
    else {
        panic!("expected a resolved post");
    };
    assert_eq!(event.content, "gm");
    assert_eq!(author.label(), "Fiatjaf");
}

#[tokio::test]
async fn missing_event_renders_not_found() {
    let id = "f".repeat(64);
    let report = mount(&options("nostr-post", &[("event-id", id.as_str())]), Fixtures::default())
        .await
        .unwrap();

    assert_eq!(report.status, Status::Error);
    assert_eq!(
        report.view.map(|view| view.body),
        Some(ViewBody::ErrorPanel { message: "Event not found".into() })
    );
}

#[tokio::test]
async fn connection_failure_is_reported_without_cause() {
    let fixtures = Fixtures::parse(r#"{ "connect_error": "tls handshake failed" }"#).unwrap();
    let report = mount(&options("nostr-profile", &[("nip05", "alice@example.com")]), fixtures)
        .await
        .unwrap();

    assert_eq!(report.status, Status::Error);
    assert_eq!(report.attributes.get("connection-status").map(String::as_str), Some("error"));

    let mut out = Vec::new();
    report.write_text(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("view: error: Unable to connect to relays"));
    assert!(!text.contains("tls handshake failed"));
}

#[tokio::test]
async fn json_report_carries_event_details() {
    let mut fixtures = Fixtures::default();
    fixtures.profiles.insert(
        "alice@example.com".into(),
        nostrframe_core::Profile { pubkey: PUBKEY.into(), ..Default::default() },
    );
    let report = mount(&options("nostr-profile", &[("nip05", "Alice@Example.com")]), fixtures)
        .await
        .unwrap();

    let mut out = Vec::new();
    report.write_json(&mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["status"], "ready");
    assert_eq!(json["view"]["body"]["kind"], "ready");
    let ready = json["events"].as_array().unwrap().iter().find(|e| e["name"] == "nc:ready").unwrap();
    assert_eq!(ready["detail"]["entity"]["pubkey"], PUBKEY);
}

#[tokio::test]
async fn unknown_element_is_a_registry_error() {
    let result = mount(&options("nostr-zap", &[]), Fixtures::default()).await;

    assert!(matches!(result, Err(CliError::Registry(RegistryError::NotDefined(tag))) if tag == "nostr-zap"));
}

#[test]
fn unreadable_fixture_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let err = Fixtures::load(&path).unwrap_err();
    assert!(matches!(err, CliError::ReadFixtures { .. }));
    assert!(err.to_string().contains("missing.json"));

    let bad = fixture_file("[]");
    assert!(matches!(Fixtures::load(bad.path()), Err(CliError::ParseFixtures { .. })));
}
