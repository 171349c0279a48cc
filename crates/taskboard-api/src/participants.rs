//! Handlers for `/participants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/participants` | Registration order |
//! | `POST` | `/participants` | Body: [`NewParticipant`]; registers the caller; 201 |
//! | `GET`  | `/participants/{id}` | 404 if never registered |
//! | `GET`  | `/participants/{id}/records` | Assigned record IDs |
//! | `GET`  | `/participants/{id}/progress` | [`ProgressView`] |
//! | `GET`  | `/participants/{id}/completion` | `{"identity":..., "percentage": n}` |
//! | `POST` | `/participants/{id}/deactivate` | Authority only |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use taskboard_core::{
  Identity, RecordId,
  aggregate::ProgressView,
  participant::{NewParticipant, Participant},
  store::TrackerStore,
};

use crate::{
  AppState,
  auth::Caller,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /participants`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<Participant>>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let participants = state.store.list_participants().await.map_err(ApiError::store)?;
  Ok(Json(participants))
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /participants`, body: `{"name":"...","contact":"..."}`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<NewParticipant>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let participant = state.store.register(caller, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(participant)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /participants/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Identity>,
) -> Result<Json<Participant>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let participant = state
    .store
    .get_participant(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("participant {id} not found")))?;
  Ok(Json(participant))
}

/// `GET /participants/{id}/records`
pub async fn records<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Identity>,
) -> Result<Json<Vec<RecordId>>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let ids = state.store.records_for(id).await.map_err(ApiError::store)?;
  Ok(Json(ids))
}

// ─── Aggregation ──────────────────────────────────────────────────────────────

/// `GET /participants/{id}/progress`
pub async fn progress<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Identity>,
) -> Result<Json<ProgressView>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let view = state.store.progress(id).await.map_err(ApiError::store)?;
  Ok(Json(view))
}

#[derive(Debug, Serialize)]
pub struct Completion {
  pub identity:   Identity,
  pub percentage: u8,
}

/// `GET /participants/{id}/completion`
pub async fn completion<S>(
  State(state): State<AppState<S>>,
  PathParam(id): PathParam<Identity>,
) -> Result<Json<Completion>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let percentage = state
    .store
    .completion_percentage(id.clone())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Completion { identity: id, percentage }))
}

// ─── Deactivate ───────────────────────────────────────────────────────────────

/// `POST /participants/{id}/deactivate`
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Identity>,
) -> Result<Json<Participant>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let participant = state.store.deactivate(caller, id).await.map_err(ApiError::store)?;
  Ok(Json(participant))
}
