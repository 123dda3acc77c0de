//! Contract Test: Record Changes Through Route53Api
//!
//! Constraints verified:
//! - Create submits exactly one CREATE
//! - Replace submits DELETE(old) then CREATE(new), never inverted
//! - Upsert creates, replaces or does nothing depending on the zone
//! - Rejected batches surface as errors instead of being swallowed
//! - Invalid records are refused before anything is submitted

mod common;

use common::*;
use r53_core::change_batch::ChangeAction;
use r53_core::error::Error;
use r53_core::record::{RecordType, ResourceRecord};
use r53_core::traits::{Route53Api, UpdateResult};

#[tokio::test]
async fn create_submits_a_single_create() {
    let api = RecordingRoute53::new();
    let record = a_record("foo.example.com", 300, "1.2.3.4");

    let change = api
        .create_resource_record_set("Z1", record.clone())
        .await
        .expect("create succeeds");
    assert_eq!(change.id, "C0001");

    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1);
    let (zone_id, batch) = &submitted[0];
    assert_eq!(zone_id, "Z1");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.changes()[0].action, ChangeAction::Create);
    assert_eq!(batch.changes()[0].record, record);
}

#[tokio::test]
async fn replace_submits_delete_then_create() {
    let api = RecordingRoute53::new();
    let old = a_record("foo.example.com", 300, "1.2.3.4");
    let new = a_record("foo.example.com", 300, "5.6.7.8");

    api.replace_resource_record_set("Z1", old.clone(), new.clone())
        .await
        .expect("replace succeeds");

    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1, "replace must be one atomic batch");
    let batch = &submitted[0].1;
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.changes()[0].action, ChangeAction::Delete);
    assert_eq!(batch.changes()[0].record, old);
    assert_eq!(batch.changes()[1].action, ChangeAction::Create);
    assert_eq!(batch.changes()[1].record, new);
}

#[tokio::test]
async fn rejected_batch_is_returned_as_error() {
    let api = RecordingRoute53::new();
    api.reject_submissions("Tried to create resource record set but it already exists");

    let err = api
        .create_resource_record_set("Z1", a_record("foo.example.com", 300, "1.2.3.4"))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, code, .. } => {
            assert_eq!(status, 400);
            assert_eq!(code, "InvalidChangeBatch");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_record_is_not_submitted() {
    let api = RecordingRoute53::new();
    let empty = ResourceRecord::new("foo.example.com", RecordType::A, 300, Vec::<String>::new());

    let err = api.create_resource_record_set("Z1", empty).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn upsert_creates_missing_record() {
    let api = RecordingRoute53::new()
        .with_record_sets(vec![a_record("other.example.com.", 300, "9.9.9.9")]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("foo.example.com", 300, "1.2.3.4"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateResult::Created { .. }));
    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].1.changes()[0].action, ChangeAction::Create);
}

#[tokio::test]
async fn upsert_replaces_with_listed_record_first() {
    // Route 53 lists names with a trailing dot; the DELETE must carry the
    // set exactly as listed
    let listed = a_record("foo.example.com.", 300, "1.2.3.4");
    let api = RecordingRoute53::new().with_record_sets(vec![listed.clone()]);
    let desired = a_record("foo.example.com", 300, "5.6.7.8");

    let result = api
        .upsert_resource_record_set("Z1", desired.clone())
        .await
        .unwrap();

    match result {
        UpdateResult::Updated { previous, .. } => assert_eq!(previous, listed),
        other => panic!("expected Updated, got {:?}", other),
    }

    let batch = &api.submitted()[0].1;
    let rendered: Vec<(ChangeAction, &str)> = batch
        .changes()
        .iter()
        .map(|op| (op.action, op.record.values[0].as_str()))
        .collect();
    assert_eq!(
        rendered,
        vec![(ChangeAction::Delete, "1.2.3.4"), (ChangeAction::Create, "5.6.7.8")]
    );
    assert_eq!(batch.changes()[0].record, listed);
    assert_eq!(batch.changes()[1].record, desired);
}

#[tokio::test]
async fn upsert_finds_wildcard_listed_with_octal_escape() {
    // Route 53 lists `*` as `\052`
    let listed = a_record("\\052.example.com.", 300, "1.2.3.4");
    let api = RecordingRoute53::new().with_record_sets(vec![listed.clone()]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("*.example.com", 300, "5.6.7.8"))
        .await
        .unwrap();

    match result {
        UpdateResult::Updated { previous, .. } => assert_eq!(previous, listed),
        other => panic!("expected Updated, got {:?}", other),
    }

    let batch = &api.submitted()[0].1;
    assert_eq!(batch.changes()[0].action, ChangeAction::Delete);
    assert_eq!(batch.changes()[0].record.name, "\\052.example.com.");
    assert_eq!(batch.changes()[1].action, ChangeAction::Create);
}

#[tokio::test]
async fn upsert_of_unchanged_wildcard_sends_nothing() {
    let api = RecordingRoute53::new()
        .with_record_sets(vec![a_record("\\052.example.com.", 300, "1.2.3.4")]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("*.example.com", 300, "1.2.3.4"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateResult::Unchanged { .. }));
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn upsert_of_identical_record_sends_nothing() {
    let api = RecordingRoute53::new()
        .with_record_sets(vec![a_record("FOO.example.com.", 300, "1.2.3.4")]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("foo.example.com", 300, "1.2.3.4"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateResult::Unchanged { .. }));
    assert!(api.submitted().is_empty());
    assert_eq!(api.list_call_count(), 1);
}

#[tokio::test]
async fn upsert_treats_ttl_change_as_update() {
    let api = RecordingRoute53::new()
        .with_record_sets(vec![a_record("foo.example.com.", 60, "1.2.3.4")]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("foo.example.com", 300, "1.2.3.4"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateResult::Updated { .. }));
}

#[tokio::test]
async fn upsert_ignores_sets_of_other_types() {
    let aaaa = ResourceRecord::new("foo.example.com.", RecordType::Aaaa, 300, ["::1"]);
    let api = RecordingRoute53::new().with_record_sets(vec![aaaa]);

    let result = api
        .upsert_resource_record_set("Z1", a_record("foo.example.com", 300, "1.2.3.4"))
        .await
        .unwrap();

    assert!(matches!(result, UpdateResult::Created { .. }));
}

#[tokio::test]
async fn get_zone_matches_name_prefix_case_insensitively() {
    let api = RecordingRoute53::new().with_zones(vec![
        zone("Z1", "example.org."),
        zone("Z2", "Example.com."),
        zone("Z3", "example.com.au."),
    ]);

    let found = api.get_zone("example.com").await.unwrap().expect("zone found");
    assert_eq!(found.id, "Z2");

    assert!(api.get_zone("missing.net").await.unwrap().is_none());
}
