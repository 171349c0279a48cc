//! Handlers for the read-only views: `GET /leaderboard` and `GET /events`.

use axum::{
  Json,
  extract::State,
};
use serde::Deserialize;
use taskboard_core::{
  aggregate::LeaderboardEntry,
  event::{Event, EventQuery},
  store::TrackerStore,
};

use crate::{AppState, error::ApiError, extract::QueryParams};

/// Upper bound on `limit` for a single page of events.
pub const MAX_EVENT_PAGE: usize = 1000;

/// `GET /leaderboard`
pub async fn leaderboard<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  let board = state.store.leaderboard().await.map_err(ApiError::store)?;
  Ok(Json(board))
}

#[derive(Debug, Deserialize, Default)]
pub struct EventParams {
  /// Only events with a larger sequence number.
  pub after: Option<u64>,
  pub limit: Option<usize>,
}

/// `GET /events[?after=<seq>][&limit=<n>]`
pub async fn events<S>(
  State(state): State<AppState<S>>,
  QueryParams(params): QueryParams<EventParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: TrackerStore + Clone + 'static,
{
  if params.limit == Some(0) {
    return Err(ApiError::BadRequest("limit must be positive".into()));
  }
  let query = EventQuery {
    after: params.after,
    limit: params.limit.map(|l| l.min(MAX_EVENT_PAGE)),
  };
  let events = state.store.events(query).await.map_err(ApiError::store)?;
  Ok(Json(events))
}
