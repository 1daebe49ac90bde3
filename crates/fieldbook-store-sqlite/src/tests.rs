//! Integration tests for `SqliteStore` against an in-memory database.

use fieldbook_core::{
  store::{Page, SubmissionStore},
  submission::{AttributePayload, NewSubmission},
};
use serde_json::{Map, Value};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn structured(key: &str, value: &str) -> AttributePayload {
  let mut map = Map::new();
  map.insert(key.to_string(), Value::String(value.to_string()));
  AttributePayload::Structured(map)
}

fn submission(odk_id: &str, data: AttributePayload) -> NewSubmission {
  NewSubmission {
    odk_id:   odk_id.to_string(),
    data,
    location: Some(vec![0x01, 0xAA, 0xBB]),
  }
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_new_row() {
  let s = store().await;

  let created = s
    .upsert(submission("form-1", structured("crop", "maize")))
    .await
    .unwrap();
  assert_eq!(created.odk_id, "form-1");
  assert!(created.data.contains("maize"));
  assert_eq!(created.location, Some(vec![0x01, 0xAA, 0xBB]));
}

#[tokio::test]
async fn upsert_same_key_updates_in_place() {
  let s = store().await;

  let first = s
    .upsert(submission("form-1", structured("crop", "maize")))
    .await
    .unwrap();
  let second = s
    .upsert(NewSubmission {
      odk_id:   "form-1".to_string(),
      data:     structured("crop", "sorghum"),
      location: Some(vec![0x01, 0xCC]),
    })
    .await
    .unwrap();

  // Same row, new payload.
  assert_eq!(second.id, first.id);
  assert!(second.data.contains("sorghum"));
  assert_eq!(second.location, Some(vec![0x01, 0xCC]));
  assert!(second.received_at >= first.received_at);

  let all = s.list(Page::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all[0].data.contains("sorghum"));
}

#[tokio::test]
async fn upsert_different_keys_do_not_collide() {
  let s = store().await;
  s.upsert(submission("form-1", structured("a", "1"))).await.unwrap();
  s.upsert(submission("form-2", structured("a", "2"))).await.unwrap();

  assert_eq!(s.list(Page::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn upsert_stores_raw_text_payload_verbatim() {
  let s = store().await;
  let created = s
    .upsert(NewSubmission {
      odk_id:   "form-raw".to_string(),
      data:     AttributePayload::RawText("{\"k\": 1}".to_string()),
      location: None,
    })
    .await
    .unwrap();
  assert_eq!(created.data, "{\"k\": 1}");
  assert_eq!(created.location, None);
}

// ─── Insert (XML path: no de-duplication) ────────────────────────────────────

#[tokio::test]
async fn insert_always_appends() {
  let s = store().await;

  let a = s.insert(submission("form-1", structured("n", "1"))).await.unwrap();
  let b = s.insert(submission("form-1", structured("n", "2"))).await.unwrap();

  assert_ne!(a.id, b.id);
  assert_eq!(s.list(Page::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn upsert_after_insert_updates_first_match() {
  let s = store().await;

  let a = s.insert(submission("form-1", structured("n", "1"))).await.unwrap();
  let b = s.insert(submission("form-1", structured("n", "2"))).await.unwrap();

  let updated = s
    .upsert(submission("form-1", structured("n", "3")))
    .await
    .unwrap();
  assert_eq!(updated.id, a.id);

  // The later duplicate is untouched.
  let untouched = s.get(b.id).await.unwrap().unwrap();
  assert!(untouched.data.contains("\"2\""));
}

// ─── Get / list ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_id_ordered_and_paged() {
  let s = store().await;
  for i in 0..5 {
    s.insert(submission(&format!("form-{i}"), structured("n", &i.to_string())))
      .await
      .unwrap();
  }

  let page = s.list(Page { offset: 1, limit: Some(2) }).await.unwrap();
  assert_eq!(page.len(), 2);
  assert!(page[0].id < page[1].id);
  assert_eq!(page[0].odk_id, "form-1");
  assert_eq!(page[1].odk_id, "form-2");
}

#[tokio::test]
async fn default_list_is_unbounded() {
  let s = store().await;
  for i in 0..120 {
    s.insert(submission(&format!("form-{i}"), structured("n", &i.to_string())))
      .await
      .unwrap();
  }

  let all = s.list(Page::default()).await.unwrap();
  assert_eq!(all.len(), 120);
}

#[tokio::test]
async fn list_empty_store() {
  let s = store().await;
  assert!(s.list(Page::default()).await.unwrap().is_empty());
}
