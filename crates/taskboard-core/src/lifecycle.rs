//! Guarded operations over the registry and the record state machine.
//!
//! Every function here takes the state it needs by reference, evaluates all
//! guards, and returns the updated values without touching the originals.
//! Backends look the inputs up, call these inside their critical section or
//! transaction, and write the outputs back only on `Ok`. That keeps every
//! operation all-or-nothing regardless of backend.

use chrono::{DateTime, Utc};

use crate::{
  Error, Identity, RecordId, Result,
  access::{require_active, require_assignee, require_authority},
  event::EventKind,
  participant::{NewParticipant, Participant},
  record::{NewRecord, Record, Trigger},
};

/// The values a backend must persist after a successful operation, plus the
/// event to append.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
  pub value: T,
  pub event: EventKind,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Whether a registration created a profile or revived an inactive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
  Created,
  Reactivated,
}

/// Register `caller`. An inactive profile is reactivated in place, keeping
/// its score, record history and registration order. The authority can
/// never be a participant.
pub fn register(
  caller: &Identity,
  authority: &Identity,
  existing: Option<&Participant>,
  input: NewParticipant,
  now: DateTime<Utc>,
) -> Result<Outcome<(Participant, Registration)>> {
  if caller == authority {
    return Err(Error::Unauthorized);
  }
  if existing.is_some_and(|p| p.active) {
    return Err(Error::AlreadyRegistered(caller.clone()));
  }
  input.validate()?;

  match existing {
    Some(previous) => {
      let mut revived = previous.clone();
      revived.name = input.name.trim().to_owned();
      revived.contact = input.contact.trim().to_owned();
      revived.active = true;
      Ok(Outcome {
        value: (revived, Registration::Reactivated),
        event: EventKind::Reactivated { participant: caller.clone() },
      })
    }
    None => Ok(Outcome {
      value: (input.into_participant(caller.clone(), now), Registration::Created),
      event: EventKind::Registered { participant: caller.clone() },
    }),
  }
}

/// Deactivate `target`. Authority only.
pub fn deactivate(
  caller: &Identity,
  authority: &Identity,
  target_id: &Identity,
  target: Option<&Participant>,
) -> Result<Outcome<Participant>> {
  require_authority(caller, authority)?;
  let target = target.ok_or_else(|| Error::ParticipantNotFound(target_id.clone()))?;
  if !target.active {
    return Err(Error::validation(format!("participant {target_id} is already inactive")));
  }

  let mut updated = target.clone();
  updated.active = false;
  Ok(Outcome {
    value: updated,
    event: EventKind::Deactivated { participant: target_id.clone() },
  })
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Create record `next_id` for `input.assignee`. Authority only; the
/// assignee must be an active participant.
pub fn create_record(
  caller: &Identity,
  authority: &Identity,
  assignee: Option<&Participant>,
  input: NewRecord,
  next_id: RecordId,
  now: DateTime<Utc>,
) -> Result<Outcome<Record>> {
  require_authority(caller, authority)?;
  if !assignee.is_some_and(|p| p.active) {
    return Err(Error::validation(format!(
      "assignee {} is not an active participant",
      input.assignee
    )));
  }
  input.validate()?;

  let record = input.into_record(next_id, now);
  let event = EventKind::RecordCreated {
    record_id: record.record_id,
    assignee:  record.assignee.clone(),
    points:    record.points,
  };
  Ok(Outcome { value: record, event })
}

/// `NotStarted → InProgress`. Caller must be the assignee and active.
pub fn start(
  caller: &Identity,
  record: &Record,
  caller_profile: Option<&Participant>,
) -> Result<Outcome<Record>> {
  require_assignee(caller, record)?;
  require_active(caller_profile)?;

  let mut updated = record.clone();
  updated.advance(Trigger::Start)?;
  Ok(Outcome {
    event: EventKind::RecordStarted {
      record_id:   updated.record_id,
      participant: caller.clone(),
    },
    value: updated,
  })
}

/// `InProgress | NeedsRevision → Completed`, storing the submission
/// reference.
pub fn submit(
  caller: &Identity,
  record: &Record,
  reference: &str,
  now: DateTime<Utc>,
) -> Result<Outcome<Record>> {
  require_assignee(caller, record)?;

  let mut updated = record.clone();
  updated.advance(Trigger::Submit)?;

  let reference = reference.trim();
  if reference.is_empty() {
    return Err(Error::validation("submission reference must not be empty"));
  }
  updated.submission = reference.to_owned();
  updated.completed_at = Some(now);

  Ok(Outcome {
    event: EventKind::RecordSubmitted {
      record_id:   updated.record_id,
      participant: caller.clone(),
    },
    value: updated,
  })
}

/// Result of [`verify`]: the updated record and, on approval, the credited
/// assignee profile.
#[derive(Debug, Clone)]
pub struct Verdict {
  pub record:   Record,
  pub assignee: Option<Participant>,
}

/// `Completed → Verified` (approve) or `Completed → NeedsRevision` (reject).
/// Authority only. Approval credits the record's points to `assignee`.
pub fn verify(
  caller: &Identity,
  authority: &Identity,
  record: &Record,
  assignee: Option<&Participant>,
  approve: bool,
  feedback: &str,
  now: DateTime<Utc>,
) -> Result<Outcome<Verdict>> {
  require_authority(caller, authority)?;

  let mut updated = record.clone();
  updated.feedback = feedback.trim().to_owned();

  if !approve {
    updated.advance(Trigger::Reject)?;
    return Ok(Outcome {
      event: EventKind::RecordRejected {
        record_id:   updated.record_id,
        participant: updated.assignee.clone(),
      },
      value: Verdict { record: updated, assignee: None },
    });
  }

  updated.advance(Trigger::Approve)?;
  updated.verified_at = Some(now);

  let mut credited = assignee
    .ok_or_else(|| Error::ParticipantNotFound(record.assignee.clone()))?
    .clone();
  credited.credit(updated.points)?;

  Ok(Outcome {
    event: EventKind::RecordVerified {
      record_id:   updated.record_id,
      participant: updated.assignee.clone(),
      points:      updated.points,
    },
    value: Verdict { record: updated, assignee: Some(credited) },
  })
}
