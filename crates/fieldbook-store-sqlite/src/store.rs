//! [`SqliteStore`] — the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use fieldbook_core::{
  store::{Page, SubmissionStore},
  submission::{NewSubmission, Submission},
};

use crate::{
  Error, Result,
  encode::{RawSubmission, encode_dt},
  schema::SCHEMA,
};

const SELECT_COLUMNS: &str =
  "SELECT id, odk_id, data, geolocation, received_at FROM submissions";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fieldbook submission store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// serialise on the connection's worker thread, which is what makes the
/// upsert's read-then-write atomic without a unique constraint.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn map_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubmission> {
  Ok(RawSubmission {
    id:          row.get(0)?,
    odk_id:      row.get(1)?,
    data:        row.get(2)?,
    geolocation: row.get(3)?,
    received_at: row.get(4)?,
  })
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  async fn upsert(&self, input: NewSubmission) -> Result<Submission> {
    let odk_id      = input.odk_id;
    let data        = input.data.into_json_text().map_err(Error::Core)?;
    let location    = input.location;
    let received_at = encode_dt(Utc::now());

    let raw: RawSubmission = self
      .conn
      .call(move |conn| {
        // One transaction around lookup + write + read-back: either the whole
        // upsert lands or none of it does, and no partial row is ever
        // observable. Dropping the transaction on an early `?` rolls back.
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM submissions WHERE odk_id = ?1 ORDER BY id LIMIT 1",
            rusqlite::params![odk_id],
            |r| r.get(0),
          )
          .optional()?;

        let id = match existing {
          Some(id) => {
            tx.execute(
              "UPDATE submissions
               SET data = ?1, geolocation = ?2, received_at = ?3
               WHERE id = ?4",
              rusqlite::params![data, location, received_at, id],
            )?;
            id
          }
          None => {
            tx.execute(
              "INSERT INTO submissions (odk_id, data, geolocation, received_at)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![odk_id, data, location, received_at],
            )?;
            tx.last_insert_rowid()
          }
        };

        let raw = tx.query_row(
          &format!("{SELECT_COLUMNS} WHERE id = ?1"),
          rusqlite::params![id],
          map_raw,
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_submission()
  }

  async fn insert(&self, input: NewSubmission) -> Result<Submission> {
    let odk_id      = input.odk_id;
    let data        = input.data.into_json_text().map_err(Error::Core)?;
    let location    = input.location;
    let received_at = encode_dt(Utc::now());

    let raw: RawSubmission = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO submissions (odk_id, data, geolocation, received_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![odk_id, data, location, received_at],
        )?;
        let id = tx.last_insert_rowid();

        let raw = tx.query_row(
          &format!("{SELECT_COLUMNS} WHERE id = ?1"),
          rusqlite::params![id],
          map_raw,
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_submission()
  }

  async fn get(&self, id: i64) -> Result<Option<Submission>> {
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT_COLUMNS} WHERE id = ?1"),
              rusqlite::params![id],
              map_raw,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list(&self, page: Page) -> Result<Vec<Submission>> {
    // SQLite treats a negative LIMIT as "no limit", which is exactly the
    // unbounded read-all contract of `limit: None`.
    let limit = page.limit.unwrap_or(-1);

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("{SELECT_COLUMNS} ORDER BY id LIMIT ?1 OFFSET ?2"))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, page.offset], map_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }
}
