//! The `SubmissionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `fieldbook-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::submission::{NewSubmission, Submission};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Paging parameters for [`SubmissionStore::list`].
///
/// A `limit` of `None` means unbounded: the default read-all retrieval
/// returns every row, and paging is strictly opt-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
  pub offset: i64,
  pub limit:  Option<i64>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Fieldbook submission store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert-or-update keyed on `odk_id`.
  ///
  /// If a row with the same `odk_id` exists, its `data`, `location` and
  /// `received_at` are overwritten in place (first match by id wins); no
  /// second row is created. Otherwise a new row is inserted. The whole
  /// operation must be atomic: a storage failure mid-way leaves no partial
  /// write visible to subsequent reads.
  fn upsert(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Unconditional insert, no `odk_id` de-duplication.
  ///
  /// Used by the XML ingestion path, which always appends a fresh row even
  /// when the key already exists.
  fn insert(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Point lookup by primary key. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// An id-ordered page of submissions.
  fn list(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;
}
