//! Error types for `taskboard-core`.
//!
//! Every variant except [`Error::Serialization`] is a rejected operation:
//! the caller's request was refused and no state changed.

use thiserror::Error;

use crate::{
  identity::Identity,
  record::{RecordId, RecordStatus, Trigger},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("caller is not permitted to perform this operation")]
  Unauthorized,

  #[error("record not found: {0}")]
  NotFound(RecordId),

  #[error("participant not found: {0}")]
  ParticipantNotFound(Identity),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("cannot {trigger} record {record_id} while it is {from}")]
  InvalidStateTransition {
    record_id: RecordId,
    from:      RecordStatus,
    trigger:   Trigger,
  },

  #[error("participant {0} is already registered")]
  AlreadyRegistered(Identity),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so that callers holding a generic
/// `S::Error` can still tell a domain rejection from an I/O failure.
pub trait AsCoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error this value wraps, if any.
  fn core_error(&self) -> Option<&Error>;
}

impl AsCoreError for Error {
  fn core_error(&self) -> Option<&Error> { Some(self) }
}
