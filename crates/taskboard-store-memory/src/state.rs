//! The plain, lock-free state that [`crate::MemoryStore`] guards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use taskboard_core::{
  Error, Identity, RecordId, Result,
  event::{Event, EventKind, EventQuery},
  participant::Participant,
  record::Record,
};

#[derive(Debug, Default)]
pub struct State {
  /// Registration order.
  participants: Vec<Participant>,
  by_identity:  HashMap<Identity, usize>,
  /// Indexed by `RecordId`.
  records:      Vec<Record>,
  assigned:     HashMap<Identity, Vec<RecordId>>,
  events:       Vec<Event>,
}

impl State {
  // ── Registry ──────────────────────────────────────────────────────────────

  pub fn participant(&self, identity: &Identity) -> Option<&Participant> {
    self.by_identity.get(identity).map(|&i| &self.participants[i])
  }

  pub fn participants(&self) -> &[Participant] { &self.participants }

  /// Insert a new profile or overwrite an existing one in place.
  pub fn put_participant(&mut self, participant: Participant) {
    match self.by_identity.get(&participant.identity) {
      Some(&i) => self.participants[i] = participant,
      None => {
        self
          .by_identity
          .insert(participant.identity.clone(), self.participants.len());
        self.participants.push(participant);
      }
    }
  }

  pub fn records_for(&self, identity: &Identity) -> &[RecordId] {
    self.assigned.get(identity).map(Vec::as_slice).unwrap_or_default()
  }

  // ── Records ───────────────────────────────────────────────────────────────

  pub fn record(&self, record_id: RecordId) -> Result<&Record> {
    usize::try_from(record_id)
      .ok()
      .and_then(|i| self.records.get(i))
      .ok_or(Error::NotFound(record_id))
  }

  pub fn next_record_id(&self) -> RecordId { self.records.len() as RecordId }

  /// Append a freshly created record. Its ID must be [`Self::next_record_id`].
  pub fn push_record(&mut self, record: Record) {
    debug_assert_eq!(record.record_id, self.next_record_id());
    self
      .assigned
      .entry(record.assignee.clone())
      .or_default()
      .push(record.record_id);
    self.records.push(record);
  }

  /// Overwrite an existing record.
  pub fn put_record(&mut self, record: Record) {
    let slot = record.record_id as usize;
    self.records[slot] = record;
  }

  // ── Events ────────────────────────────────────────────────────────────────

  pub fn append_event(&mut self, kind: EventKind, at: DateTime<Utc>) -> &Event {
    let seq = self.events.len() as u64 + 1;
    tracing::info!(
      seq,
      kind = kind.discriminant(),
      participant = %kind.participant(),
      record_id = ?kind.record_id(),
      "event appended"
    );
    self.events.push(Event { seq, at, kind });
    &self.events[self.events.len() - 1]
  }

  pub fn events(&self, query: EventQuery) -> Vec<Event> {
    // Sequence numbers are dense from 1, so `after` is also a slice offset.
    let start = query
      .after
      .map(|after| usize::try_from(after).unwrap_or(usize::MAX))
      .unwrap_or(0)
      .min(self.events.len());
    self.events[start..]
      .iter()
      .take(query.limit())
      .cloned()
      .collect()
  }
}
