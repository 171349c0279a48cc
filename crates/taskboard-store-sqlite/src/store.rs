//! The SQLite implementation of [`TrackerStore`].

use std::path::Path;

use taskboard_core::{
  Identity, RecordId,
  aggregate::{self, LeaderboardEntry, ProgressView},
  event::{Event, EventQuery},
  participant::{NewParticipant, Participant},
  record::{NewRecord, Record},
  store::TrackerStore,
};

use crate::{Error, Result, schema::SCHEMA, tx};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Taskboard store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:      tokio_rusqlite::Connection,
  authority: Identity,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and bind
  /// it to `authority`.
  ///
  /// Fails with [`Error::AuthorityMismatch`] if the file was created for a
  /// different authority.
  pub async fn open(path: impl AsRef<Path>, authority: Identity) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, authority).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory(authority: Identity) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, authority).await
  }

  async fn init(conn: tokio_rusqlite::Connection, authority: Identity) -> Result<Self> {
    let store = Self { conn, authority };
    store.init_schema().await?;

    let authority = store.authority.clone();
    store
      .conn
      .call(move |conn| Ok(tx::claim_authority(conn, &authority)))
      .await??;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = Error;

  fn authority(&self) -> &Identity { &self.authority }

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn register(&self, caller: Identity, input: NewParticipant) -> Result<Participant> {
    let authority = self.authority.clone();
    self
      .conn
      .call(move |conn| Ok(tx::register(conn, &authority, caller, input)))
      .await?
  }

  async fn deactivate(&self, caller: Identity, participant: Identity) -> Result<Participant> {
    let authority = self.authority.clone();
    self
      .conn
      .call(move |conn| Ok(tx::deactivate(conn, &authority, caller, participant)))
      .await?
  }

  async fn get_participant(&self, identity: Identity) -> Result<Option<Participant>> {
    self
      .conn
      .call(move |conn| Ok(tx::participant(conn, &identity)))
      .await?
  }

  async fn list_participants(&self) -> Result<Vec<Participant>> {
    self.conn.call(|conn| Ok(tx::participants(conn))).await?
  }

  async fn records_for(&self, identity: Identity) -> Result<Vec<RecordId>> {
    self
      .conn
      .call(move |conn| Ok(tx::records_for(conn, &identity)))
      .await?
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn create_record(&self, caller: Identity, input: NewRecord) -> Result<Record> {
    let authority = self.authority.clone();
    self
      .conn
      .call(move |conn| Ok(tx::create_record(conn, &authority, caller, input)))
      .await?
  }

  async fn start(&self, caller: Identity, record_id: RecordId) -> Result<Record> {
    self
      .conn
      .call(move |conn| Ok(tx::start(conn, caller, record_id)))
      .await?
  }

  async fn submit(&self, caller: Identity, record_id: RecordId, reference: String) -> Result<Record> {
    self
      .conn
      .call(move |conn| Ok(tx::submit(conn, caller, record_id, &reference)))
      .await?
  }

  async fn verify(
    &self,
    caller:    Identity,
    record_id: RecordId,
    approve:   bool,
    feedback:  String,
  ) -> Result<Record> {
    let authority = self.authority.clone();
    self
      .conn
      .call(move |conn| {
        Ok(tx::verify(conn, &authority, caller, record_id, approve, &feedback))
      })
      .await?
  }

  async fn get_record(&self, record_id: RecordId) -> Result<Record> {
    self
      .conn
      .call(move |conn| Ok(tx::record(conn, record_id)))
      .await?
  }

  async fn record_count(&self) -> Result<u64> {
    self.conn.call(|conn| Ok(tx::record_count(conn))).await?
  }

  // ── Aggregation ───────────────────────────────────────────────────────────

  async fn progress(&self, identity: Identity) -> Result<ProgressView> {
    self
      .conn
      .call(move |conn| Ok(tx::progress(conn, &identity)))
      .await?
  }

  async fn completion_percentage(&self, identity: Identity) -> Result<u8> {
    Ok(self.progress(identity).await?.completion_percentage())
  }

  async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
    let participants = self.list_participants().await?;
    Ok(aggregate::leaderboard(&participants))
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn events(&self, query: EventQuery) -> Result<Vec<Event>> {
    self.conn.call(move |conn| Ok(tx::events(conn, query))).await?
  }
}
