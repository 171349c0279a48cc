//! Notification events appended by every mutating operation.
//!
//! Events are advisory: observers (dashboards, indexers) poll the log by
//! sequence number. They are not part of the consistency contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Identity, RecordId, Result};

/// What happened. The variant name is the `kind` discriminant stored by
/// backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
  // ── Registry ──────────────────────────────────────────────────────────────
  Registered { participant: Identity },
  Reactivated { participant: Identity },
  Deactivated { participant: Identity },

  // ── Records ───────────────────────────────────────────────────────────────
  RecordCreated { record_id: RecordId, assignee: Identity, points: u32 },
  RecordStarted { record_id: RecordId, participant: Identity },
  RecordSubmitted { record_id: RecordId, participant: Identity },
  RecordVerified { record_id: RecordId, participant: Identity, points: u32 },
  RecordRejected { record_id: RecordId, participant: Identity },
}

impl EventKind {
  /// The operation name; matches the `rename_all = "snake_case"` serde tags.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Registered { .. } => "registered",
      Self::Reactivated { .. } => "reactivated",
      Self::Deactivated { .. } => "deactivated",
      Self::RecordCreated { .. } => "record_created",
      Self::RecordStarted { .. } => "record_started",
      Self::RecordSubmitted { .. } => "record_submitted",
      Self::RecordVerified { .. } => "record_verified",
      Self::RecordRejected { .. } => "record_rejected",
    }
  }

  /// The participant the event concerns.
  pub fn participant(&self) -> &Identity {
    match self {
      Self::Registered { participant }
      | Self::Reactivated { participant }
      | Self::Deactivated { participant }
      | Self::RecordStarted { participant, .. }
      | Self::RecordSubmitted { participant, .. }
      | Self::RecordVerified { participant, .. }
      | Self::RecordRejected { participant, .. } => participant,
      Self::RecordCreated { assignee, .. } => assignee,
    }
  }

  /// The record the event concerns, if any.
  pub fn record_id(&self) -> Option<RecordId> {
    match self {
      Self::Registered { .. } | Self::Reactivated { .. } | Self::Deactivated { .. } => None,
      Self::RecordCreated { record_id, .. }
      | Self::RecordStarted { record_id, .. }
      | Self::RecordSubmitted { record_id, .. }
      | Self::RecordVerified { record_id, .. }
      | Self::RecordRejected { record_id, .. } => Some(*record_id),
    }
  }

  /// Serialise the inner payload (without the type tag).
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild from the discriminant and payload stored by a backend.
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "type": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

/// An entry in the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  /// Starts at 1; strictly increasing.
  pub seq:  u64,
  pub at:   DateTime<Utc>,
  #[serde(flatten)]
  pub kind: EventKind,
}

/// Parameters for [`crate::store::TrackerStore::events`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventQuery {
  /// Only return events with `seq > after`.
  pub after: Option<u64>,
  pub limit: Option<usize>,
}

impl EventQuery {
  pub const DEFAULT_LIMIT: usize = 100;

  pub fn limit(&self) -> usize { self.limit.unwrap_or(Self::DEFAULT_LIMIT) }
}
