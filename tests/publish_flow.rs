//! End-to-end publish runs against in-memory collaborators.

mod support;

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use cadencer::models::{Client, ServiceKind};
use cadencer::services::PostPublisher;
use cadencer::Error;

use support::{raw_file, FakeDocumentService, FakeFileStore};

fn publishing_client() -> Client {
    let mut client = Client::new(Uuid::new_v4(), "acme".into(), "Acme Co".into());
    client.cadence_record_id = Some("rec-1".to_string());
    for (key, folder) in [
        ("next_post", "next-post-folder"),
        ("pending", "pending-folder"),
        ("scheduling", "scheduling-folder"),
    ] {
        client.add_resource(ServiceKind::Drive, key, folder.into(), "".into(), "".into());
    }
    client.add_resource(
        ServiceKind::Notion,
        "client_page",
        "client-page-id".into(),
        "".into(),
        "".into(),
    );
    client
}

fn cadence_record_with_cycle(cycle: &str) -> serde_json::Value {
    json!({
        "Cycle ID": {
            "type": "rich_text",
            "rich_text": [{ "plain_text": cycle }],
        }
    })
}

#[tokio::test]
async fn publishes_groups_in_order_with_relocation_and_gap_warning() {
    let client = publishing_client();

    let store = Arc::new(
        FakeFileStore::default()
            .with_folder(
                "next-post-folder",
                vec![
                    raw_file("f2a", "2a-z.jpg", "image/jpeg"),
                    raw_file("f4", "4-w.jpg", "image/jpeg"),
                    raw_file("f1", "1-x.jpg", "image/jpeg"),
                    raw_file("f2", "2-y.jpg", "image/jpeg"),
                ],
            )
            .with_folder(
                "pending-folder",
                vec![
                    raw_file("p1", "x.jpg", "image/jpeg"),
                    raw_file("p2", "unrelated.png", "image/png"),
                ],
            ),
    );
    let docs = Arc::new(
        FakeDocumentService::default().with_page("rec-1", cadence_record_with_cycle("C7")),
    );

    let publisher = PostPublisher::new(store.clone(), docs.clone(), "content-db".to_string());
    let summary = publisher.publish(&client).await.unwrap();

    assert_eq!(summary.groups_published, 3);
    assert_eq!(summary.groups_failed, 0);
    assert_eq!(summary.files_moved, 1);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("expected number 3")));

    // The pending file whose base name matches the "1-x" match key moved
    // to scheduling; the unrelated one stayed put
    let moves = store.moves.lock().unwrap();
    assert_eq!(
        moves.as_slice(),
        &[(
            "p1".to_string(),
            "pending-folder".to_string(),
            "scheduling-folder".to_string()
        )]
    );
    let folders = store.folders.lock().unwrap();
    assert_eq!(folders["pending-folder"].len(), 1);
    assert_eq!(folders["scheduling-folder"].len(), 1);
    drop(folders);

    // Every published main asset was made public
    let public = store.public_files.lock().unwrap();
    assert_eq!(public.as_slice(), &["f1", "f2", "f4"]);

    // Records carry the cycle-prefixed identifier, in group order
    assert_eq!(
        docs.created_identifiers(),
        vec!["C7 1-x", "C7 2-y", "C7 4-w"]
    );
}

#[tokio::test]
async fn record_gets_draft_status_relations_and_main_first_embeds() {
    let client = publishing_client();

    let store = Arc::new(FakeFileStore::default().with_folder(
        "next-post-folder",
        vec![
            raw_file("f1", "1-x.jpg", "image/jpeg"),
            raw_file("f1a", "1a-y.jpg", "image/jpeg"),
        ],
    ));
    let docs = Arc::new(
        FakeDocumentService::default().with_page("rec-1", cadence_record_with_cycle("C7")),
    );

    let publisher = PostPublisher::new(store, docs.clone(), "content-db".to_string());
    publisher.publish(&client).await.unwrap();

    let created = docs.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let (database_id, props) = &created[0];
    assert_eq!(database_id, "content-db");
    assert_eq!(
        props.pointer("/Status/status/name").and_then(|v| v.as_str()),
        Some("Draft")
    );
    assert_eq!(
        props
            .pointer("/File Link/url")
            .and_then(|v| v.as_str()),
        Some("https://drive.google.com/file/d/f1/view?usp=drive_web")
    );
    assert_eq!(
        props
            .pointer("/Client/relation/0/id")
            .and_then(|v| v.as_str()),
        Some("client-page-id")
    );
    assert_eq!(
        props
            .pointer("/Cadence Record/relation/0/id")
            .and_then(|v| v.as_str()),
        Some("rec-1")
    );
    drop(created);

    // Main asset embedded first, then the secondary
    let blocks = docs.blocks.lock().unwrap();
    let children = &blocks["page-1"];
    assert_eq!(children.len(), 2);
    let urls: Vec<&str> = children
        .iter()
        .filter_map(|b| b.pointer("/embed/url").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://drive.google.com/file/d/f1/preview",
            "https://drive.google.com/file/d/f1a/preview",
        ]
    );
}

#[tokio::test]
async fn orphan_secondary_produces_no_record() {
    let client = publishing_client();

    let store = Arc::new(FakeFileStore::default().with_folder(
        "next-post-folder",
        vec![raw_file("f3a", "3a-x.jpg", "image/jpeg")],
    ));
    let docs = Arc::new(
        FakeDocumentService::default().with_page("rec-1", cadence_record_with_cycle("C7")),
    );

    let publisher = PostPublisher::new(store.clone(), docs.clone(), "content-db".to_string());
    let summary = publisher.publish(&client).await.unwrap();

    assert_eq!(summary.groups_published, 0);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("main image 3 is missing")));
    assert!(docs.created.lock().unwrap().is_empty());
    assert!(store.public_files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_folder_is_a_no_op() {
    let client = publishing_client();
    let store = Arc::new(FakeFileStore::default().with_folder("next-post-folder", vec![]));
    let docs = Arc::new(FakeDocumentService::default());

    let publisher = PostPublisher::new(store, docs.clone(), "content-db".to_string());
    let summary = publisher.publish(&client).await.unwrap();

    assert_eq!(summary.groups_published, 0);
    assert_eq!(summary.files_moved, 0);
    assert!(summary.warnings.is_empty());
    assert!(docs.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_next_post_folder_is_a_configuration_error() {
    let client = Client::new(Uuid::new_v4(), "acme".into(), "Acme Co".into());
    let store = Arc::new(FakeFileStore::default());
    let docs = Arc::new(FakeDocumentService::default());

    let publisher = PostPublisher::new(store, docs, "content-db".to_string());
    let err = publisher.publish(&client).await.unwrap_err();
    assert!(matches!(err, Error::ConfigMissing(_)));
}

#[tokio::test]
async fn failed_group_is_skipped_and_the_rest_still_publish() {
    let client = publishing_client();

    let store = Arc::new(FakeFileStore::default().with_folder(
        "next-post-folder",
        vec![
            raw_file("f1", "1-x.jpg", "image/jpeg"),
            raw_file("f2", "2-y.jpg", "image/jpeg"),
            raw_file("f3", "3-z.jpg", "image/jpeg"),
        ],
    ));
    let docs = Arc::new(
        FakeDocumentService::default().with_page("rec-1", cadence_record_with_cycle("C7")),
    );
    *docs.fail_create_containing.lock().unwrap() = Some("2-y".to_string());

    let publisher = PostPublisher::new(store, docs.clone(), "content-db".to_string());
    let summary = publisher.publish(&client).await.unwrap();

    assert_eq!(summary.groups_published, 2);
    assert_eq!(summary.groups_failed, 1);
    assert_eq!(docs.created_identifiers(), vec!["C7 1-x", "C7 3-z"]);
}

#[tokio::test]
async fn missing_cycle_identifier_falls_back_to_bare_names() {
    let mut client = publishing_client();
    client.cadence_record_id = None;

    let store = Arc::new(FakeFileStore::default().with_folder(
        "next-post-folder",
        vec![raw_file("f1", "1-x.jpg", "image/jpeg")],
    ));
    let docs = Arc::new(FakeDocumentService::default());

    let publisher = PostPublisher::new(store, docs.clone(), "content-db".to_string());
    let summary = publisher.publish(&client).await.unwrap();

    assert_eq!(summary.groups_published, 1);
    assert_eq!(docs.created_identifiers(), vec!["1-x"]);
}
