//! JSON REST API for Taskboard.
//!
//! Exposes an axum [`Router`] backed by any [`TrackerStore`]. The caller of
//! every mutating route is resolved by [`auth::Caller`]; reads are open.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = taskboard_api::router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod auth;
pub mod board;
pub mod error;
pub mod extract;
pub mod participants;
pub mod records;


use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use taskboard_core::store::TrackerStore;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: TrackerStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: TrackerStore> AppState<S> {
  pub fn new(store: S, auth: AuthConfig) -> Self {
    Self { store: Arc::new(store), auth: Arc::new(auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TrackerStore + Clone + 'static,
{
  Router::new()
    // Registry
    .route(
      "/participants",
      get(participants::list::<S>).post(participants::register::<S>),
    )
    .route("/participants/{id}", get(participants::get_one::<S>))
    .route("/participants/{id}/records", get(participants::records::<S>))
    .route("/participants/{id}/progress", get(participants::progress::<S>))
    .route("/participants/{id}/completion", get(participants::completion::<S>))
    .route("/participants/{id}/deactivate", post(participants::deactivate::<S>))
    // Records
    .route("/records", post(records::create::<S>))
    .route("/records/{id}", get(records::get_one::<S>))
    .route("/records/{id}/start", post(records::start::<S>))
    .route("/records/{id}/submit", post(records::submit::<S>))
    .route("/records/{id}/verify", post(records::verify::<S>))
    // Views
    .route("/leaderboard", get(board::leaderboard::<S>))
    .route("/events", get(board::events::<S>))
    .with_state(state)
}
