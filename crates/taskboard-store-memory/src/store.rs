//! The in-memory implementation of [`TrackerStore`].

use std::sync::Arc;

use chrono::Utc;
use taskboard_core::{
  Error, Identity, RecordId, Result,
  aggregate::{self, LeaderboardEntry, ProgressView},
  event::{Event, EventQuery},
  lifecycle::{self, Registration},
  participant::{NewParticipant, Participant},
  record::{NewRecord, Record},
  store::TrackerStore,
};
use tokio::sync::RwLock;

use crate::state::State;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Taskboard store held entirely in process memory.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
  authority: Identity,
  state:     Arc<RwLock<State>>,
}

impl MemoryStore {
  pub fn new(authority: Identity) -> Self {
    Self { authority, state: Arc::default() }
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for MemoryStore {
  type Error = Error;

  fn authority(&self) -> &Identity { &self.authority }

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn register(&self, caller: Identity, input: NewParticipant) -> Result<Participant> {
    let mut state = self.state.write().await;
    let now = Utc::now();

    let existing = state.participant(&caller);
    let outcome = lifecycle::register(&caller, &self.authority, existing, input, now)?;
    let (participant, how) = outcome.value;
    if how == Registration::Reactivated {
      tracing::debug!(participant = %caller, "reactivating profile");
    }

    state.put_participant(participant.clone());
    state.append_event(outcome.event, now);
    Ok(participant)
  }

  async fn deactivate(&self, caller: Identity, participant: Identity) -> Result<Participant> {
    let mut state = self.state.write().await;

    let outcome = lifecycle::deactivate(
      &caller,
      &self.authority,
      &participant,
      state.participant(&participant),
    )?;

    state.put_participant(outcome.value.clone());
    state.append_event(outcome.event, Utc::now());
    Ok(outcome.value)
  }

  async fn get_participant(&self, identity: Identity) -> Result<Option<Participant>> {
    Ok(self.state.read().await.participant(&identity).cloned())
  }

  async fn list_participants(&self) -> Result<Vec<Participant>> {
    Ok(self.state.read().await.participants().to_vec())
  }

  async fn records_for(&self, identity: Identity) -> Result<Vec<RecordId>> {
    Ok(self.state.read().await.records_for(&identity).to_vec())
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn create_record(&self, caller: Identity, input: NewRecord) -> Result<Record> {
    let mut state = self.state.write().await;
    let now = Utc::now();

    let assignee = state.participant(&input.assignee);
    let outcome = lifecycle::create_record(
      &caller,
      &self.authority,
      assignee,
      input,
      state.next_record_id(),
      now,
    )?;

    state.push_record(outcome.value.clone());
    state.append_event(outcome.event, now);
    Ok(outcome.value)
  }

  async fn start(&self, caller: Identity, record_id: RecordId) -> Result<Record> {
    let mut state = self.state.write().await;

    let record = state.record(record_id)?;
    let outcome = lifecycle::start(&caller, record, state.participant(&caller))?;

    state.put_record(outcome.value.clone());
    state.append_event(outcome.event, Utc::now());
    Ok(outcome.value)
  }

  async fn submit(&self, caller: Identity, record_id: RecordId, reference: String) -> Result<Record> {
    let mut state = self.state.write().await;
    let now = Utc::now();

    let outcome = lifecycle::submit(&caller, state.record(record_id)?, &reference, now)?;

    state.put_record(outcome.value.clone());
    state.append_event(outcome.event, now);
    Ok(outcome.value)
  }

  async fn verify(
    &self,
    caller:    Identity,
    record_id: RecordId,
    approve:   bool,
    feedback:  String,
  ) -> Result<Record> {
    let mut state = self.state.write().await;
    let now = Utc::now();

    let record = state.record(record_id)?;
    let assignee = state.participant(&record.assignee);
    let outcome =
      lifecycle::verify(&caller, &self.authority, record, assignee, approve, &feedback, now)?;

    let verdict = outcome.value;
    if let Some(credited) = verdict.assignee {
      state.put_participant(credited);
    }
    state.put_record(verdict.record.clone());
    state.append_event(outcome.event, now);
    Ok(verdict.record)
  }

  async fn get_record(&self, record_id: RecordId) -> Result<Record> {
    self.state.read().await.record(record_id).cloned()
  }

  async fn record_count(&self) -> Result<u64> {
    Ok(self.state.read().await.next_record_id())
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  async fn progress(&self, identity: Identity) -> Result<ProgressView> {
    let state = self.state.read().await;
    let assigned = state.records_for(&identity).len() as u64;
    Ok(ProgressView::new(state.participant(&identity), assigned))
  }

  async fn completion_percentage(&self, identity: Identity) -> Result<u8> {
    Ok(self.progress(identity).await?.completion_percentage())
  }

  async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
    Ok(aggregate::leaderboard(self.state.read().await.participants()))
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn events(&self, query: EventQuery) -> Result<Vec<Event>> {
    Ok(self.state.read().await.events(query))
  }
}
