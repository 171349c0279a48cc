//! Participants: registered identities eligible to be assigned records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Identity, Result};

/// A registered participant profile. Profiles are never deleted; the
/// authority may deactivate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub identity:      Identity,
  pub name:          String,
  pub contact:       String,
  pub registered_at: DateTime<Utc>,
  pub active:        bool,
  /// Sum of points from approved records.
  pub score:         u64,
  /// Number of approved records.
  pub completed:     u64,
}

impl Participant {
  /// Credit one approved record worth `points`.
  ///
  /// Leaves `self` untouched on overflow.
  pub fn credit(&mut self, points: u32) -> Result<()> {
    let score = self
      .score
      .checked_add(u64::from(points))
      .ok_or_else(|| Error::validation(format!("score overflow for {}", self.identity)))?;
    let completed = self
      .completed
      .checked_add(1)
      .ok_or_else(|| Error::validation(format!("completed-count overflow for {}", self.identity)))?;
    self.score = score;
    self.completed = completed;
    Ok(())
  }
}

/// Input to [`crate::store::TrackerStore::register`]. The identity is the
/// caller's; it is never taken from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParticipant {
  pub name:    String,
  pub contact: String,
}

impl NewParticipant {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("name must not be empty"));
    }
    if self.contact.trim().is_empty() {
      return Err(Error::validation("contact must not be empty"));
    }
    Ok(())
  }

  pub fn into_participant(self, identity: Identity, now: DateTime<Utc>) -> Participant {
    Participant {
      identity,
      name: self.name.trim().to_owned(),
      contact: self.contact.trim().to_owned(),
      registered_at: now,
      active: true,
      score: 0,
      completed: 0,
    }
  }
}
