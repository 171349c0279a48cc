//! Synchronous bodies of every store operation.
//!
//! These run on the `tokio_rusqlite` connection thread. Each mutating
//! function opens one transaction, loads what the guards in
//! [`taskboard_core::lifecycle`] need, and commits only after every guard has
//! passed. Returning early drops the transaction, which rolls it back.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use taskboard_core::{
  Identity, RecordId,
  aggregate::ProgressView,
  event::{Event, EventKind, EventQuery},
  lifecycle::{self, Registration},
  participant::{NewParticipant, Participant},
  record::{NewRecord, Record},
};

use crate::{
  Error, Result,
  encode::{
    EVENT_COLUMNS, PARTICIPANT_COLUMNS, RECORD_COLUMNS, RawEvent, RawParticipant, RawRecord,
    encode_counter, encode_dt, encode_record_id, encode_status,
  },
};

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn participant(conn: &Connection, identity: &Identity) -> Result<Option<Participant>> {
  let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE identity = ?1");
  conn
    .query_row(&sql, rusqlite::params![identity.as_str()], RawParticipant::from_row)
    .optional()?
    .map(RawParticipant::into_participant)
    .transpose()
}

pub fn participants(conn: &Connection) -> Result<Vec<Participant>> {
  let sql = format!("SELECT {PARTICIPANT_COLUMNS} FROM participants ORDER BY seq");
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawParticipant::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawParticipant::into_participant).collect()
}

pub fn records_for(conn: &Connection, identity: &Identity) -> Result<Vec<RecordId>> {
  let mut stmt =
    conn.prepare("SELECT record_id FROM records WHERE assignee = ?1 ORDER BY record_id")?;
  let ids = stmt
    .query_map(rusqlite::params![identity.as_str()], |row| row.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  ids
    .into_iter()
    .map(|id| u64::try_from(id).map_err(|_| Error::Decode(format!("record_id {id} out of range"))))
    .collect()
}

/// Progress for `identity`; the zero view if it never registered.
pub fn progress(conn: &Connection, identity: &Identity) -> Result<ProgressView> {
  let profile = participant(conn, identity)?;
  let assigned = assigned_count(conn, identity)?;
  Ok(ProgressView::new(profile.as_ref(), assigned))
}

fn assigned_count(conn: &Connection, identity: &Identity) -> Result<u64> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM records WHERE assignee = ?1",
    rusqlite::params![identity.as_str()],
    |row| row.get(0),
  )?;
  Ok(n.unsigned_abs())
}

pub fn record(conn: &Connection, record_id: RecordId) -> Result<Record> {
  let key = encode_record_id(record_id)?;
  let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1");
  conn
    .query_row(&sql, rusqlite::params![key], RawRecord::from_row)
    .optional()?
    .ok_or(taskboard_core::Error::NotFound(record_id))?
    .into_record()
}

/// Records are never deleted, so the row count is also the next ID.
pub fn record_count(conn: &Connection) -> Result<u64> {
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
  Ok(n.unsigned_abs())
}

pub fn events(conn: &Connection, query: EventQuery) -> Result<Vec<Event>> {
  let after = encode_counter(query.after.unwrap_or(0))?;
  let limit = i64::try_from(query.limit()).unwrap_or(i64::MAX);
  let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE seq > ?1 ORDER BY seq LIMIT ?2");
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params![after, limit], RawEvent::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawEvent::into_event).collect()
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Insert a profile, or update it in place keeping its `seq` and
/// `registered_at`.
fn put_participant(conn: &Connection, p: &Participant) -> Result<()> {
  conn.execute(
    "INSERT INTO participants (identity, name, contact, registered_at, active, score, completed)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(identity) DO UPDATE SET
       name      = excluded.name,
       contact   = excluded.contact,
       active    = excluded.active,
       score     = excluded.score,
       completed = excluded.completed",
    rusqlite::params![
      p.identity.as_str(),
      p.name,
      p.contact,
      encode_dt(p.registered_at),
      p.active,
      encode_counter(p.score)?,
      encode_counter(p.completed)?,
    ],
  )?;
  Ok(())
}

fn insert_record(conn: &Connection, r: &Record) -> Result<()> {
  conn.execute(
    "INSERT INTO records (
       record_id, title, description, category, assignee, status,
       created_at, completed_at, verified_at, submission, feedback, points
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      encode_record_id(r.record_id)?,
      r.title,
      r.description,
      i64::from(r.category),
      r.assignee.as_str(),
      encode_status(r.status),
      encode_dt(r.created_at),
      r.completed_at.map(encode_dt),
      r.verified_at.map(encode_dt),
      r.submission,
      r.feedback,
      i64::from(r.points),
    ],
  )?;
  Ok(())
}

/// Persist the fields a transition may change.
fn update_record(conn: &Connection, r: &Record) -> Result<()> {
  conn.execute(
    "UPDATE records
     SET status = ?2, completed_at = ?3, verified_at = ?4, submission = ?5, feedback = ?6
     WHERE record_id = ?1",
    rusqlite::params![
      encode_record_id(r.record_id)?,
      encode_status(r.status),
      r.completed_at.map(encode_dt),
      r.verified_at.map(encode_dt),
      r.submission,
      r.feedback,
    ],
  )?;
  Ok(())
}

fn append_event(conn: &Connection, kind: EventKind, at: DateTime<Utc>) -> Result<Event> {
  let record_id = kind.record_id().map(encode_record_id).transpose()?;
  conn.execute(
    "INSERT INTO events (kind, participant, record_id, data_json, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      kind.discriminant(),
      kind.participant().as_str(),
      record_id,
      kind.to_json()?.to_string(),
      encode_dt(at),
    ],
  )?;
  let seq = conn.last_insert_rowid().unsigned_abs();
  Ok(Event { seq, at, kind })
}

/// Log an event once its transaction has committed.
fn trace_committed(event: &Event) {
  tracing::info!(
    seq = event.seq,
    kind = event.kind.discriminant(),
    participant = %event.kind.participant(),
    record_id = ?event.kind.record_id(),
    "event appended"
  );
}

// ─── Operations ──────────────────────────────────────────────────────────────

pub fn register(
  conn: &mut Connection,
  authority: &Identity,
  caller: Identity,
  input: NewParticipant,
) -> Result<Participant> {
  let tx = conn.transaction()?;
  let now = Utc::now();

  let existing = participant(&tx, &caller)?;
  let outcome = lifecycle::register(&caller, authority, existing.as_ref(), input, now)?;
  let (profile, how) = outcome.value;
  if how == Registration::Reactivated {
    tracing::debug!(participant = %caller, "reactivating profile");
  }

  put_participant(&tx, &profile)?;
  let event = append_event(&tx, outcome.event, now)?;
  tx.commit()?;

  trace_committed(&event);
  Ok(profile)
}

pub fn deactivate(
  conn: &mut Connection,
  authority: &Identity,
  caller: Identity,
  target: Identity,
) -> Result<Participant> {
  let tx = conn.transaction()?;

  let existing = participant(&tx, &target)?;
  let outcome = lifecycle::deactivate(&caller, authority, &target, existing.as_ref())?;

  put_participant(&tx, &outcome.value)?;
  let event = append_event(&tx, outcome.event, Utc::now())?;
  tx.commit()?;

  trace_committed(&event);
  Ok(outcome.value)
}

pub fn create_record(
  conn: &mut Connection,
  authority: &Identity,
  caller: Identity,
  input: NewRecord,
) -> Result<Record> {
  let tx = conn.transaction()?;
  let now = Utc::now();

  let assignee = participant(&tx, &input.assignee)?;
  let next_id = record_count(&tx)?;
  let outcome =
    lifecycle::create_record(&caller, authority, assignee.as_ref(), input, next_id, now)?;

  insert_record(&tx, &outcome.value)?;
  let event = append_event(&tx, outcome.event, now)?;
  tx.commit()?;

  trace_committed(&event);
  Ok(outcome.value)
}

pub fn start(conn: &mut Connection, caller: Identity, record_id: RecordId) -> Result<Record> {
  let tx = conn.transaction()?;

  let current = record(&tx, record_id)?;
  let profile = participant(&tx, &caller)?;
  let outcome = lifecycle::start(&caller, &current, profile.as_ref())?;

  update_record(&tx, &outcome.value)?;
  let event = append_event(&tx, outcome.event, Utc::now())?;
  tx.commit()?;

  trace_committed(&event);
  Ok(outcome.value)
}

pub fn submit(
  conn: &mut Connection,
  caller: Identity,
  record_id: RecordId,
  reference: &str,
) -> Result<Record> {
  let tx = conn.transaction()?;
  let now = Utc::now();

  let current = record(&tx, record_id)?;
  let outcome = lifecycle::submit(&caller, &current, reference, now)?;

  update_record(&tx, &outcome.value)?;
  let event = append_event(&tx, outcome.event, now)?;
  tx.commit()?;

  trace_committed(&event);
  Ok(outcome.value)
}

pub fn verify(
  conn: &mut Connection,
  authority: &Identity,
  caller: Identity,
  record_id: RecordId,
  approve: bool,
  feedback: &str,
) -> Result<Record> {
  let tx = conn.transaction()?;
  let now = Utc::now();

  let current = record(&tx, record_id)?;
  let assignee = participant(&tx, &current.assignee)?;
  let outcome = lifecycle::verify(
    &caller,
    authority,
    &current,
    assignee.as_ref(),
    approve,
    feedback,
    now,
  )?;

  let verdict = outcome.value;
  if let Some(credited) = &verdict.assignee {
    put_participant(&tx, credited)?;
  }
  update_record(&tx, &verdict.record)?;
  let event = append_event(&tx, outcome.event, now)?;
  tx.commit()?;

  trace_committed(&event);
  Ok(verdict.record)
}

/// Record `authority` on first open; afterwards refuse any other.
pub fn claim_authority(conn: &mut Connection, authority: &Identity) -> Result<()> {
  let tx = conn.transaction()?;
  tx.execute(
    "INSERT OR IGNORE INTO meta (key, value) VALUES ('authority', ?1)",
    rusqlite::params![authority.as_str()],
  )?;
  let stored: String =
    tx.query_row("SELECT value FROM meta WHERE key = 'authority'", [], |row| row.get(0))?;
  tx.commit()?;

  if stored != authority.as_str() {
    return Err(Error::AuthorityMismatch { stored, configured: authority.clone() });
  }
  Ok(())
}
