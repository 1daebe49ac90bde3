//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Attribute data is stored as the
//! JSON text the core already normalised it to. Geometry blobs pass through
//! untouched — the store never interprets them.

use chrono::{DateTime, Utc};
use fieldbook_core::submission::Submission;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row structs ─────────────────────────────────────────────────────────────

/// A `submissions` row exactly as SQLite hands it back, before any parsing.
pub struct RawSubmission {
  pub id:          i64,
  pub odk_id:      String,
  pub data:        String,
  pub geolocation: Option<Vec<u8>>,
  pub received_at: String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:          self.id,
      odk_id:      self.odk_id,
      data:        self.data,
      location:    self.geolocation,
      received_at: decode_dt(&self.received_at)?,
    })
  }
}
