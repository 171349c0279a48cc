//! Records, the trackable unit of work, and the status transition table.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Identity, Result};

/// Dense, append-only record identifier. Valid IDs are `0..count`.
pub type RecordId = u64;

/// Inclusive bound on [`Record::category`] (the programme week number).
pub const CATEGORY_RANGE: RangeInclusive<u8> = 1..=12;

// ─── Status ──────────────────────────────────────────────────────────────────

/// The lifecycle status of a record.
///
/// `NotStarted → InProgress → Completed → {Verified | NeedsRevision}`, with
/// `NeedsRevision → Completed` on resubmission. `Verified` is terminal.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordStatus {
  #[default]
  NotStarted,
  InProgress,
  Completed,
  Verified,
  NeedsRevision,
}

/// An event that drives a record from one status to the next.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
  Start,
  Submit,
  Approve,
  Reject,
}

impl RecordStatus {
  /// Look up the transition table. `None` means the trigger is not legal from
  /// this status.
  pub fn next(self, trigger: Trigger) -> Option<Self> {
    use RecordStatus::*;
    match (self, trigger) {
      (NotStarted, Trigger::Start) => Some(InProgress),
      (InProgress | NeedsRevision, Trigger::Submit) => Some(Completed),
      (Completed, Trigger::Approve) => Some(Verified),
      (Completed, Trigger::Reject) => Some(NeedsRevision),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A unit of work assigned by the authority to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub record_id:    RecordId,
  pub title:        String,
  pub description:  String,
  pub category:     u8,
  pub assignee:     Identity,
  pub status:       RecordStatus,
  pub created_at:   DateTime<Utc>,
  /// Set on every submission; `None` until the first one.
  pub completed_at: Option<DateTime<Utc>>,
  /// Set when the authority approves the record.
  pub verified_at:  Option<DateTime<Utc>>,
  /// Reference to the submitted work (a link, a commit hash).
  pub submission:   String,
  pub feedback:     String,
  /// Awarded once, on approval. Fixed at creation.
  pub points:       u32,
}

impl Record {
  /// Apply `trigger` to the status, or fail naming the current status.
  pub(crate) fn advance(&mut self, trigger: Trigger) -> Result<()> {
    match self.status.next(trigger) {
      Some(next) => {
        self.status = next;
        Ok(())
      }
      None => Err(Error::InvalidStateTransition {
        record_id: self.record_id,
        from: self.status,
        trigger,
      }),
    }
  }
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::TrackerStore::create_record`].
/// The ID, status and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub category:    u8,
  pub assignee:    Identity,
  #[serde(default)]
  pub points:      u32,
}

impl NewRecord {
  /// Field checks that do not depend on stored state.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::validation("title must not be empty"));
    }
    if !CATEGORY_RANGE.contains(&self.category) {
      return Err(Error::validation(format!(
        "category {} is outside {}..={}",
        self.category,
        CATEGORY_RANGE.start(),
        CATEGORY_RANGE.end()
      )));
    }
    Ok(())
  }

  /// Build the stored record once the store has assigned an ID.
  pub fn into_record(self, record_id: RecordId, now: DateTime<Utc>) -> Record {
    Record {
      record_id,
      title: self.title,
      description: self.description,
      category: self.category,
      assignee: self.assignee,
      status: RecordStatus::NotStarted,
      created_at: now,
      completed_at: None,
      verified_at: None,
      submission: String::new(),
      feedback: String::new(),
      points: self.points,
    }
  }
}
