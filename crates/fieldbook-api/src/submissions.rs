//! Handlers for the submission endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | liveness message |
//! | `POST` | `/submissions/` | JSON body; upserts on `odk_id`; JSON or XML per `Accept` |
//! | `POST` | `/submissions/xml/` | raw XML body; always inserts; JSON response |
//! | `GET`  | `/submissions/` | optional `?offset=&limit=`; JSON or XML per `Accept` |
//! | `GET`  | `/submissions/:id` | JSON; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use fieldbook_core::{
  store::{Page, SubmissionStore},
  submission::{AttributePayload, NewSubmission, Submission},
};
use fieldbook_geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{error::ApiError, xml};

// ─── Response shaping ────────────────────────────────────────────────────────

/// A submission as rendered to clients, JSON and XML alike.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
  pub id:          i64,
  pub odk_id:      String,
  /// Stored JSON text decoded back to a structured value; falls back to the
  /// raw string when the stored blob does not parse.
  pub data:        Value,
  /// Stored EWKB re-transcoded to WKT; null when the row has no location or
  /// the stored blob does not decode.
  pub geolocation: Option<String>,
  pub received_at: DateTime<Utc>,
}

impl SubmissionResponse {
  /// Shape a stored row for output.
  ///
  /// Both conversions are best-effort: the response reflects exactly what
  /// the store now holds, and a row that fails to transcode still renders
  /// with the failing field nulled rather than aborting the request.
  pub fn from_submission(sub: Submission) -> Self {
    let data = match serde_json::from_str(&sub.data) {
      Ok(value) => value,
      Err(_) => Value::String(sub.data.clone()),
    };

    let geolocation = sub.location.as_deref().and_then(|blob| {
      match Point::from_ewkb(blob) {
        Ok(point) => Some(point.to_wkt()),
        Err(e) => {
          tracing::error!(
            submission_id = sub.id,
            error = %e,
            "failed to decode stored geolocation"
          );
          None
        }
      }
    });

    SubmissionResponse {
      id: sub.id,
      odk_id: sub.odk_id,
      data,
      geolocation,
      received_at: sub.received_at,
    }
  }
}

// ─── Content negotiation ─────────────────────────────────────────────────────

/// XML is opt-in: only when the `Accept` header names the markup media type.
/// Anything else, including no header at all, means JSON.
fn wants_xml(headers: &HeaderMap) -> bool {
  headers
    .get(header::ACCEPT)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.contains("application/xml"))
}

fn xml_response(body: String) -> Response {
  ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

// ─── Liveness ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn root() -> Json<Value> {
  Json(json!({ "message": "Fieldbook ingestion API is running" }))
}

// ─── Create (JSON body, upsert) ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub odk_id:      String,
  pub data:        AttributePayload,
  pub geolocation: String,
}

/// `POST /submissions/`
///
/// Validation is strictly pre-write: a malformed geolocation fails the whole
/// request before the store is touched.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<Response, ApiError>
where
  S: SubmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.odk_id.trim().is_empty() {
    return Err(ApiError::BadRequest("odk_id must not be empty".to_string()));
  }

  let point = Point::parse_wkt(&body.geolocation).map_err(|e| {
    tracing::debug!(error = %e, "rejected submission geolocation");
    ApiError::BadRequest("invalid geolocation format".to_string())
  })?;

  let stored = store
    .upsert(NewSubmission {
      odk_id:   body.odk_id,
      data:     body.data,
      location: Some(point.to_ewkb()),
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let resp = SubmissionResponse::from_submission(stored);
  if wants_xml(&headers) {
    Ok(xml_response(xml::submission_to_xml(&resp)))
  } else {
    Ok(Json(resp).into_response())
  }
}

// ─── Create (XML body, always-insert) ────────────────────────────────────────

/// `POST /submissions/xml/`
///
/// Legacy contract, intentionally asymmetric with the JSON path: no
/// de-duplication on `odk_id` (every request appends a row), and the response
/// echoes the submitted geolocation text instead of re-transcoding the stored
/// blob.
pub async fn create_xml<S>(
  State(store): State<Arc<S>>,
  body: String,
) -> Result<Json<SubmissionResponse>, ApiError>
where
  S: SubmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let parsed = xml::parse_submission(&body)?;

  if parsed.odk_id.trim().is_empty() {
    return Err(ApiError::BadRequest("odk_id must not be empty".to_string()));
  }

  let point = Point::parse_wkt(&parsed.geolocation)
    .map_err(|_| ApiError::BadRequest("invalid geolocation format".to_string()))?;

  let stored = store
    .insert(NewSubmission {
      odk_id:   parsed.odk_id,
      data:     AttributePayload::Structured(parsed.data.clone()),
      location: Some(point.to_ewkb()),
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(SubmissionResponse {
    id:          stored.id,
    odk_id:      stored.odk_id,
    data:        Value::Object(parsed.data),
    geolocation: Some(parsed.geolocation),
    received_at: stored.received_at,
  }))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub offset: Option<i64>,
  pub limit:  Option<i64>,
}

/// `GET /submissions/[?offset=&limit=]`
///
/// With no query parameters this returns every stored row; paging kicks in
/// only when the caller asks for it.
///
/// Per-row fault isolation: a row whose stored payload or geometry fails to
/// transcode renders degraded (raw string / null location) without aborting
/// the listing.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
  S: SubmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let page = Page {
    offset: params.offset.unwrap_or(0),
    limit:  params.limit,
  };

  let rows = store
    .list(page)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let responses: Vec<SubmissionResponse> = rows
    .into_iter()
    .map(SubmissionResponse::from_submission)
    .collect();

  if wants_xml(&headers) {
    Ok(xml_response(xml::submissions_to_xml(&responses)))
  } else {
    Ok(Json(responses).into_response())
  }
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /submissions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<SubmissionResponse>, ApiError>
where
  S: SubmissionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sub = store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;

  Ok(Json(SubmissionResponse::from_submission(sub)))
}
