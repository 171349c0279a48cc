//! Error type for `taskboard-store-sqlite`.

use taskboard_core::{AsCoreError, Identity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] taskboard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored column could not be turned back into a domain value.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("store belongs to authority {stored:?}, not {configured}")]
  AuthorityMismatch {
    stored:     String,
    configured: Identity,
  },
}

impl AsCoreError for Error {
  fn core_error(&self) -> Option<&taskboard_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
