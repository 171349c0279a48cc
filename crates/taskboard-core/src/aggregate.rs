//! Derived read models: progress, completion percentage, leaderboard.
//!
//! Computed by full scans on every call; nothing here is cached or stored.

use serde::{Deserialize, Serialize};

use crate::{Identity, participant::Participant};

/// A participant's progress, computed on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressView {
  pub name:            String,
  pub total_score:     u64,
  pub completed_count: u64,
  /// Live count of records assigned to the participant.
  pub total_assigned:  u64,
  pub is_active:       bool,
}

impl ProgressView {
  /// Build the view for `profile`, or the zero view for an unregistered
  /// identity.
  pub fn new(profile: Option<&Participant>, total_assigned: u64) -> Self {
    match profile {
      Some(p) => Self {
        name: p.name.clone(),
        total_score: p.score,
        completed_count: p.completed,
        total_assigned,
        is_active: p.active,
      },
      None => Self { total_assigned, ..Self::default() },
    }
  }

  pub fn completion_percentage(&self) -> u8 {
    completion_percentage(self.completed_count, self.total_assigned)
  }
}

/// `completed * 100 / assigned`, truncating. Zero when nothing is assigned;
/// never above 100.
pub fn completion_percentage(completed: u64, assigned: u64) -> u8 {
  if assigned == 0 {
    return 0;
  }
  let pct = u128::from(completed) * 100 / u128::from(assigned);
  pct.min(100) as u8
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub identity:  Identity,
  pub name:      String,
  pub score:     u64,
  pub completed: u64,
  pub active:    bool,
}

impl From<&Participant> for LeaderboardEntry {
  fn from(p: &Participant) -> Self {
    Self {
      identity:  p.identity.clone(),
      name:      p.name.clone(),
      score:     p.score,
      completed: p.completed,
      active:    p.active,
    }
  }
}

/// Rank `participants` (given in registration order) by descending score.
///
/// `sort_by` is stable, so equal scores keep registration order.
pub fn leaderboard<'a>(
  participants: impl IntoIterator<Item = &'a Participant>,
) -> Vec<LeaderboardEntry> {
  let mut entries: Vec<LeaderboardEntry> =
    participants.into_iter().map(LeaderboardEntry::from).collect();
  entries.sort_by(|a, b| b.score.cmp(&a.score));
  entries
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::participant::NewParticipant;

  fn participant(name: &str, score: u64) -> Participant {
    let mut p = NewParticipant { name: name.into(), contact: "c".into() }
      .into_participant(Identity::new(name).unwrap(), Utc::now());
    p.score = score;
    p
  }

  #[test]
  fn percentage_zero_when_nothing_assigned() {
    assert_eq!(completion_percentage(0, 0), 0);
    assert_eq!(completion_percentage(3, 0), 0);
  }

  #[test]
  fn percentage_truncates() {
    assert_eq!(completion_percentage(1, 3), 33);
    assert_eq!(completion_percentage(2, 3), 66);
    assert_eq!(completion_percentage(3, 3), 100);
  }

  #[test]
  fn percentage_never_exceeds_100() {
    assert_eq!(completion_percentage(5, 2), 100);
    assert_eq!(completion_percentage(u64::MAX, 1), 100);
  }

  #[test]
  fn unknown_identity_yields_zero_view() {
    let view = ProgressView::new(None, 0);
    assert_eq!(view, ProgressView::default());
    assert!(!view.is_active);
    assert_eq!(view.completion_percentage(), 0);
  }

  #[test]
  fn leaderboard_sorts_descending_with_registration_tie_break() {
    let ps = [
      participant("ann", 5),
      participant("bea", 20),
      participant("cal", 5),
      participant("dan", 20),
      participant("eve", 0),
    ];
    let order: Vec<_> = leaderboard(&ps).into_iter().map(|e| e.name).collect();
    assert_eq!(order, ["bea", "dan", "ann", "cal", "eve"]);
  }
}
