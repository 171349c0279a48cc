//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, statuses as their snake_case
//! names, event payloads as compact JSON. Counters are stored as `INTEGER`.

use chrono::{DateTime, Utc};
use taskboard_core::{
  Identity, RecordId,
  event::{Event, EventKind},
  participant::Participant,
  record::{Record, RecordStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Integers ────────────────────────────────────────────────────────────────

/// Convert a record ID to its column value. IDs beyond `i64::MAX` can never
/// have been assigned, so they are reported as not found.
pub fn encode_record_id(id: RecordId) -> Result<i64> {
  i64::try_from(id).map_err(|_| taskboard_core::Error::NotFound(id).into())
}

pub fn encode_counter(n: u64) -> Result<i64> {
  i64::try_from(n).map_err(|_| Error::Decode(format!("counter {n} exceeds column range")))
}

fn decode_unsigned<T: TryFrom<i64>>(column: &str, n: i64) -> Result<T> {
  T::try_from(n).map_err(|_| Error::Decode(format!("{column} value {n} out of range")))
}

// ─── RecordStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: RecordStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<RecordStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown record status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PARTICIPANT_COLUMNS: &str =
  "identity, name, contact, registered_at, active, score, completed";

/// Raw values read directly from a `participants` row.
pub struct RawParticipant {
  pub identity:      String,
  pub name:          String,
  pub contact:       String,
  pub registered_at: String,
  pub active:        bool,
  pub score:         i64,
  pub completed:     i64,
}

impl RawParticipant {
  /// Row mapper matching [`PARTICIPANT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity:      row.get(0)?,
      name:          row.get(1)?,
      contact:       row.get(2)?,
      registered_at: row.get(3)?,
      active:        row.get(4)?,
      score:         row.get(5)?,
      completed:     row.get(6)?,
    })
  }

  pub fn into_participant(self) -> Result<Participant> {
    Ok(Participant {
      identity:      Identity::new(&self.identity)?,
      name:          self.name,
      contact:       self.contact,
      registered_at: decode_dt(&self.registered_at)?,
      active:        self.active,
      score:         decode_unsigned("score", self.score)?,
      completed:     decode_unsigned("completed", self.completed)?,
    })
  }
}

pub const RECORD_COLUMNS: &str = "record_id, title, description, category, assignee, status, \
   created_at, completed_at, verified_at, submission, feedback, points";

/// Raw values read directly from a `records` row.
pub struct RawRecord {
  pub record_id:    i64,
  pub title:        String,
  pub description:  String,
  pub category:     i64,
  pub assignee:     String,
  pub status:       String,
  pub created_at:   String,
  pub completed_at: Option<String>,
  pub verified_at:  Option<String>,
  pub submission:   String,
  pub feedback:     String,
  pub points:       i64,
}

impl RawRecord {
  /// Row mapper matching [`RECORD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(0)?,
      title:        row.get(1)?,
      description:  row.get(2)?,
      category:     row.get(3)?,
      assignee:     row.get(4)?,
      status:       row.get(5)?,
      created_at:   row.get(6)?,
      completed_at: row.get(7)?,
      verified_at:  row.get(8)?,
      submission:   row.get(9)?,
      feedback:     row.get(10)?,
      points:       row.get(11)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      record_id:    decode_unsigned("record_id", self.record_id)?,
      title:        self.title,
      description:  self.description,
      category:     decode_unsigned("category", self.category)?,
      assignee:     Identity::new(&self.assignee)?,
      status:       decode_status(&self.status)?,
      created_at:   decode_dt(&self.created_at)?,
      completed_at: decode_opt_dt(self.completed_at)?,
      verified_at:  decode_opt_dt(self.verified_at)?,
      submission:   self.submission,
      feedback:     self.feedback,
      points:       decode_unsigned("points", self.points)?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "seq, kind, data_json, recorded_at";

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub seq:         i64,
  pub kind:        String,
  pub data_json:   String,
  pub recorded_at: String,
}

impl RawEvent {
  /// Row mapper matching [`EVENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:         row.get(0)?,
      kind:        row.get(1)?,
      data_json:   row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    let data: serde_json::Value = serde_json::from_str(&self.data_json)?;
    Ok(Event {
      seq:  decode_unsigned("seq", self.seq)?,
      at:   decode_dt(&self.recorded_at)?,
      kind: EventKind::from_parts(&self.kind, data)?,
    })
  }
}
