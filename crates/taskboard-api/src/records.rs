//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/records` | Body: [`NewRecord`]; authority only; 201 |
//! | `GET`  | `/records/{id}` | 404 outside `0..count` |
//! | `POST` | `/records/{id}/start` | Assignee only |
//! | `POST` | `/records/{id}/submit` | Body: `{"reference":"..."}` |
//! | `POST` | `/records/{id}/verify` | Body: `{"approve":true,"feedback":"..."}`; authority only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use taskboard_core::{
  RecordId,
  record::{NewRecord, Record},
  store::TrackerStore,
};

use crate::{
  AppState,
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /records`: returns 201 and the stored [`Record`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<NewRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let record = state.store.create_record(caller, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<RecordId>,
) -> Result<Json<Record>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let record = state.store.get_record(id).await.map_err(ApiError::store)?;
  Ok(Json(record))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /records/{id}/start`
pub async fn start<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<RecordId>,
) -> Result<Json<Record>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let record = state.store.start(caller, id).await.map_err(ApiError::store)?;
  Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub reference: String,
}

/// `POST /records/{id}/submit`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<RecordId>,
  JsonBody(body): JsonBody<SubmitBody>,
) -> Result<Json<Record>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let record = state
    .store
    .submit(caller, id, body.reference)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub approve:  bool,
  #[serde(default)]
  pub feedback: String,
}

/// `POST /records/{id}/verify`
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<RecordId>,
  JsonBody(body): JsonBody<VerifyBody>,
) -> Result<Json<Record>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let record = state
    .store
    .verify(caller, id, body.approve, body.feedback)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}
