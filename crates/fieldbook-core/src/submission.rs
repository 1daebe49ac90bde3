//! Submission — the sole persisted entity.
//!
//! A submission couples a client-supplied natural key (`odk_id`) with an
//! opaque attribute payload and an optional point geometry. Attributes are
//! always held as JSON *text*, exactly as stored; decoding back to a
//! structured value is a presentation concern and happens at the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A persisted submission, as read back from a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  /// Store-assigned primary key; immutable once created.
  pub id:          i64,
  /// Client-supplied de-duplication key. Not unique by constraint — the XML
  /// ingestion path may create duplicates; the upsert path matches the first
  /// row by id.
  pub odk_id:      String,
  /// Attribute payload as JSON text, byte-for-byte what the store holds.
  pub data:        String,
  /// EWKB-encoded point tagged SRID 4326, if a location was supplied.
  pub location:    Option<Vec<u8>>,
  /// Server-assigned ingestion timestamp; refreshed on every update.
  pub received_at: DateTime<Utc>,
}

/// Attribute payload as accepted at the boundary.
///
/// Clients send either a pre-serialised JSON string or a structured mapping;
/// both normalise to the same stored JSON text via [`into_json_text`].
///
/// [`into_json_text`]: AttributePayload::into_json_text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributePayload {
  RawText(String),
  Structured(Map<String, Value>),
}

impl AttributePayload {
  /// Canonical serialised form handed to the store.
  ///
  /// `RawText` passes through unchanged — the string is trusted to already
  /// be the client's intended payload and is never re-encoded.
  pub fn into_json_text(self) -> Result<String> {
    match self {
      AttributePayload::RawText(s) => Ok(s),
      AttributePayload::Structured(map) => Ok(serde_json::to_string(&map)?),
    }
  }
}

/// Input for [`SubmissionStore::upsert`] and [`SubmissionStore::insert`].
///
/// `location` carries already-validated EWKB bytes; geometry validation is
/// strictly a pre-construction concern of the caller.
///
/// [`SubmissionStore::upsert`]: crate::store::SubmissionStore::upsert
/// [`SubmissionStore::insert`]: crate::store::SubmissionStore::insert
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub odk_id:   String,
  pub data:     AttributePayload,
  pub location: Option<Vec<u8>>,
}
