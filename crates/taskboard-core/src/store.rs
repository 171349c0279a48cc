//! The `TrackerStore` trait.
//!
//! The trait is implemented by storage backends (`taskboard-store-memory`,
//! `taskboard-store-sqlite`). Higher layers (`taskboard-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  AsCoreError, Identity, RecordId,
  aggregate::{LeaderboardEntry, ProgressView},
  event::{Event, EventQuery},
  participant::{NewParticipant, Participant},
  record::{NewRecord, Record},
};

/// Abstraction over a Taskboard backend.
///
/// Every mutating method takes the calling identity, evaluates the guards in
/// [`crate::lifecycle`], and applies its effects atomically: on error no
/// state change is observable. Each successful mutation appends one
/// [`Event`].
///
/// All methods return `Send` futures.
pub trait TrackerStore: Send + Sync {
  type Error: AsCoreError + From<crate::Error>;

  /// The single identity allowed to create and verify records.
  fn authority(&self) -> &Identity;

  // ── Registry ──────────────────────────────────────────────────────────

  /// Register `caller` as a participant, or reactivate its inactive profile.
  fn register(
    &self,
    caller: Identity,
    input: NewParticipant,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Mark `participant` inactive. Authority only.
  fn deactivate(
    &self,
    caller: Identity,
    participant: Identity,
  ) -> impl Future<Output = Result<Participant, Self::Error>> + Send + '_;

  /// Retrieve a profile. Returns `None` if never registered.
  fn get_participant(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Option<Participant>, Self::Error>> + Send + '_;

  /// All profiles, in registration order.
  fn list_participants(
    &self,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  /// IDs of the records assigned to `identity`, in creation order.
  fn records_for(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Vec<RecordId>, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// Create a record with the next sequential ID. Authority only.
  fn create_record(
    &self,
    caller: Identity,
    input: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// `NotStarted → InProgress`. Assignee only.
  fn start(
    &self,
    caller: Identity,
    record_id: RecordId,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// `InProgress | NeedsRevision → Completed`. Assignee only.
  fn submit(
    &self,
    caller: Identity,
    record_id: RecordId,
    reference: String,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// `Completed → Verified | NeedsRevision`. Authority only. Approval
  /// credits the record's points to its assignee.
  fn verify(
    &self,
    caller: Identity,
    record_id: RecordId,
    approve: bool,
    feedback: String,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Retrieve a record; fails with [`crate::Error::NotFound`] outside
  /// `0..record_count()`.
  fn get_record(
    &self,
    record_id: RecordId,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Number of records ever created; also the next ID to be assigned.
  fn record_count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Aggregation ───────────────────────────────────────────────────────

  /// Progress for `identity`; the zero view if it never registered.
  fn progress(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<ProgressView, Self::Error>> + Send + '_;

  /// `completed * 100 / assigned`, truncating; 0 with nothing assigned.
  fn completion_percentage(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<u8, Self::Error>> + Send + '_;

  /// All participants by descending score; ties keep registration order.
  fn leaderboard(
    &self,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Read the event log in sequence order.
  fn events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;
}
