//! HTTP ingestion gateway for Fieldbook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fieldbook_core::store::SubmissionStore`]. The gateway validates inbound
//! WKT geometry, drives the store, and renders responses as JSON or XML per
//! the caller's `Accept` header. Transport concerns are the binary's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = fieldbook_api::router(store.clone());
//! ```

pub mod error;
pub mod submissions;
pub mod xml;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use fieldbook_core::store::SubmissionStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `fieldbook.toml` layered
/// with `FIELDBOOK_`-prefixed environment variables.
///
/// Every field has a development fallback so a bare `cargo run` works; real
/// deployments are expected to override `database_path` at minimum.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_database_path() -> PathBuf {
  PathBuf::from("fieldbook.db")
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: SubmissionStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(submissions::root))
    .route(
      "/submissions/",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route("/submissions/xml/", post(submissions::create_xml::<S>))
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
