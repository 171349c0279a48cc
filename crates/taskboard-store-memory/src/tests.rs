//! Behavioural tests for `MemoryStore`.

use taskboard_core::{
  Error, Identity, RecordId,
  event::{EventKind, EventQuery},
  participant::NewParticipant,
  record::{NewRecord, Record, RecordStatus, Trigger},
  store::TrackerStore,
};

use crate::MemoryStore;

fn id(s: &str) -> Identity { Identity::new(s).unwrap() }

fn mentor() -> Identity { id("mentor") }

fn store() -> MemoryStore { MemoryStore::new(mentor()) }

async fn register(s: &MemoryStore, who: &str) {
  s.register(id(who), NewParticipant {
    name:    who.to_uppercase(),
    contact: format!("{who}@example.com"),
  })
  .await
  .unwrap();
}

fn task(assignee: &str, points: u32) -> NewRecord {
  NewRecord {
    title: "T1".into(),
    description: "...".into(),
    category: 1,
    assignee: id(assignee),
    points,
  }
}

/// Every trigger sequence of length `1..=max_len`, shortest first.
fn trigger_sequences(max_len: usize) -> Vec<Vec<Trigger>> {
  const ALL: [Trigger; 4] = [Trigger::Start, Trigger::Submit, Trigger::Approve, Trigger::Reject];
  let mut out = Vec::new();
  let mut frontier: Vec<Vec<Trigger>> = vec![Vec::new()];
  for _ in 0..max_len {
    frontier = frontier
      .iter()
      .flat_map(|prefix| {
        ALL.iter().map(move |t| {
          let mut next = prefix.clone();
          next.push(*t);
          next
        })
      })
      .collect();
    out.extend(frontier.iter().cloned());
  }
  out
}

/// Drive record `rid` (assigned to alice) with `trigger`.
async fn fire(s: &MemoryStore, rid: RecordId, trigger: Trigger) -> Result<Record, Error> {
  match trigger {
    Trigger::Start => s.start(id("alice"), rid).await,
    Trigger::Submit => s.submit(id("alice"), rid, "ref".into()).await,
    Trigger::Approve => s.verify(mentor(), rid, true, String::new()).await,
    Trigger::Reject => s.verify(mentor(), rid, false, "redo".into()).await,
  }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_credits_points_once() {
  let s = store();
  register(&s, "alice").await;

  let r = s.create_record(mentor(), task("alice", 10)).await.unwrap();
  assert_eq!(r.record_id, 0);

  s.start(id("alice"), 0).await.unwrap();
  s.submit(id("alice"), 0, "link".into()).await.unwrap();
  let r = s.verify(mentor(), 0, true, "ok".into()).await.unwrap();
  assert_eq!(r.status, RecordStatus::Verified);

  let alice = s.get_participant(id("alice")).await.unwrap().unwrap();
  assert_eq!((alice.score, alice.completed), (10, 1));
  assert_eq!(s.get_record(0).await.unwrap().status, RecordStatus::Verified);

  let err = s.verify(mentor(), 0, true, "again".into()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidStateTransition { from: RecordStatus::Verified, .. }));
  let alice = s.get_participant(id("alice")).await.unwrap().unwrap();
  assert_eq!(alice.score, 10);
}

#[tokio::test]
async fn reject_then_resubmit() {
  let s = store();
  register(&s, "alice").await;
  s.create_record(mentor(), task("alice", 10)).await.unwrap();
  s.start(id("alice"), 0).await.unwrap();
  s.submit(id("alice"), 0, "link".into()).await.unwrap();

  let r = s.verify(mentor(), 0, false, "redo".into()).await.unwrap();
  assert_eq!(r.status, RecordStatus::NeedsRevision);
  assert_eq!(r.feedback, "redo");
  assert_eq!(s.progress(id("alice")).await.unwrap().total_score, 0);

  let r = s.submit(id("alice"), 0, "link2".into()).await.unwrap();
  assert_eq!(r.status, RecordStatus::Completed);
  assert_eq!(r.submission, "link2");
}

#[tokio::test]
async fn start_on_empty_store_is_not_found() {
  let s = store();
  register(&s, "alice").await;
  let err = s.start(id("alice"), 5).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(5)));
}

#[tokio::test]
async fn non_authority_create_changes_nothing() {
  let s = store();
  register(&s, "alice").await;
  let err = s.create_record(id("alice"), task("alice", 10)).await.unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
  assert_eq!(s.record_count().await.unwrap(), 0);
  assert!(s.records_for(id("alice")).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_operations_append_no_events() {
  let s = store();
  register(&s, "alice").await;
  s.create_record(id("alice"), task("alice", 1)).await.unwrap_err();
  s.start(id("alice"), 0).await.unwrap_err();

  let events = s.events(EventQuery::default()).await.unwrap();
  assert_eq!(events.len(), 1);
  assert!(matches!(events[0].kind, EventKind::Registered { .. }));
}

#[tokio::test]
async fn trigger_sequences_follow_transition_table() {
  const POINTS: u32 = 7;
  let s = store();
  register(&s, "alice").await;

  let mut expected_score = 0u64;
  for seq in trigger_sequences(5) {
    let rid = s.create_record(mentor(), task("alice", POINTS)).await.unwrap().record_id;
    let mut model = RecordStatus::NotStarted;

    for &trigger in &seq {
      let result = fire(&s, rid, trigger).await;
      match model.next(trigger) {
        Some(next) => {
          assert_eq!(result.unwrap().status, next, "{seq:?}");
          if trigger == Trigger::Approve {
            expected_score += u64::from(POINTS);
          }
          model = next;
        }
        None => assert!(
          matches!(
            result,
            Err(Error::InvalidStateTransition { from, trigger: t, .. }) if from == model && t == trigger
          ),
          "{seq:?}"
        ),
      }
    }
    assert_eq!(s.get_record(rid).await.unwrap().status, model, "{seq:?}");
  }

  let alice = s.get_participant(id("alice")).await.unwrap().unwrap();
  assert_eq!(alice.score, expected_score);
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_registration_rejected() {
  let s = store();
  register(&s, "alice").await;
  let err = s
    .register(id("alice"), NewParticipant { name: "A".into(), contact: "c".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyRegistered(_)));
}

#[tokio::test]
async fn deactivated_participant_reregisters_in_place() {
  let s = store();
  register(&s, "alice").await;
  register(&s, "bob").await;

  s.deactivate(mentor(), id("alice")).await.unwrap();
  let err = s.create_record(mentor(), task("alice", 1)).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let p = s
    .register(id("alice"), NewParticipant { name: "Alice".into(), contact: "new".into() })
    .await
    .unwrap();
  assert!(p.active);

  let order: Vec<_> = s
    .list_participants()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.identity)
    .collect();
  assert_eq!(order, [id("alice"), id("bob")]);
}

#[tokio::test]
async fn deactivate_requires_authority() {
  let s = store();
  register(&s, "alice").await;
  let err = s.deactivate(id("alice"), id("alice")).await.unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn authority_cannot_register_as_participant() {
  let s = store();
  let err = s
    .register(mentor(), NewParticipant { name: "Mentor".into(), contact: "m".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
  assert!(s.list_participants().await.unwrap().is_empty());
  assert!(s.events(EventQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn deactivated_assignee_cannot_start_but_may_finish() {
  let s = store();
  register(&s, "alice").await;
  s.create_record(mentor(), task("alice", 5)).await.unwrap();
  s.create_record(mentor(), task("alice", 5)).await.unwrap();
  s.start(id("alice"), 0).await.unwrap();
  s.deactivate(mentor(), id("alice")).await.unwrap();

  let err = s.start(id("alice"), 1).await.unwrap_err();
  assert!(matches!(err, Error::Unauthorized));
  assert_eq!(s.get_record(1).await.unwrap().status, RecordStatus::NotStarted);

  let r = s.submit(id("alice"), 0, "done".into()).await.unwrap();
  assert_eq!(r.status, RecordStatus::Completed);
  s.verify(mentor(), 0, true, String::new()).await.unwrap();

  let alice = s.get_participant(id("alice")).await.unwrap().unwrap();
  assert!(!alice.active);
  assert_eq!((alice.score, alice.completed), (5, 1));
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_and_percentage_track_live_assignments() {
  let s = store();
  register(&s, "alice").await;
  assert_eq!(s.completion_percentage(id("alice")).await.unwrap(), 0);

  for points in [10, 20, 30] {
    s.create_record(mentor(), task("alice", points)).await.unwrap();
  }
  s.start(id("alice"), 1).await.unwrap();
  s.submit(id("alice"), 1, "pr".into()).await.unwrap();
  s.verify(mentor(), 1, true, String::new()).await.unwrap();

  let view = s.progress(id("alice")).await.unwrap();
  assert_eq!(view.name, "ALICE");
  assert_eq!((view.total_score, view.completed_count, view.total_assigned), (20, 1, 3));
  assert!(view.is_active);
  assert_eq!(s.completion_percentage(id("alice")).await.unwrap(), 33);
  assert_eq!(s.records_for(id("alice")).await.unwrap(), [0, 1, 2]);
}

#[tokio::test]
async fn unknown_participant_progress_is_zero() {
  let s = store();
  let view = s.progress(id("nobody")).await.unwrap();
  assert_eq!(view.total_assigned, 0);
  assert!(!view.is_active);
  assert_eq!(s.completion_percentage(id("nobody")).await.unwrap(), 0);
}

#[tokio::test]
async fn leaderboard_sum_matches_verified_points() {
  let s = store();
  for who in ["ann", "bea", "cal"] {
    register(&s, who).await;
  }
  let plan = [("ann", 5, true), ("bea", 7, true), ("cal", 5, false), ("ann", 3, true)];
  for (i, (who, points, approve)) in plan.iter().enumerate() {
    let rid = i as u64;
    s.create_record(mentor(), task(who, *points)).await.unwrap();
    s.start(id(who), rid).await.unwrap();
    s.submit(id(who), rid, "x".into()).await.unwrap();
    s.verify(mentor(), rid, *approve, String::new()).await.unwrap();
  }

  let board = s.leaderboard().await.unwrap();
  let names: Vec<_> = board.iter().map(|e| e.identity.as_str()).collect();
  assert_eq!(names, ["ann", "bea", "cal"]);
  assert_eq!(board.iter().map(|e| e.score).sum::<u64>(), 15);
}

#[tokio::test]
async fn deactivated_participant_stays_on_leaderboard() {
  let s = store();
  register(&s, "ann").await;
  register(&s, "bea").await;
  s.create_record(mentor(), task("bea", 5)).await.unwrap();
  s.start(id("bea"), 0).await.unwrap();
  s.submit(id("bea"), 0, "x".into()).await.unwrap();
  s.verify(mentor(), 0, true, String::new()).await.unwrap();
  s.deactivate(mentor(), id("bea")).await.unwrap();

  let board = s.leaderboard().await.unwrap();
  let rows: Vec<_> = board.iter().map(|e| (e.identity.as_str(), e.score, e.active)).collect();
  assert_eq!(rows, [("bea", 5, false), ("ann", 0, true)]);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_are_sequenced_and_pageable() {
  let s = store();
  register(&s, "alice").await;
  s.create_record(mentor(), task("alice", 1)).await.unwrap();
  s.start(id("alice"), 0).await.unwrap();

  let all = s.events(EventQuery::default()).await.unwrap();
  let seqs: Vec<_> = all.iter().map(|e| e.seq).collect();
  assert_eq!(seqs, [1, 2, 3]);
  assert_eq!(all[2].kind.discriminant(), "record_started");

  let page = s
    .events(EventQuery { after: Some(1), limit: Some(1) })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].seq, 2);

  assert!(s.events(EventQuery { after: Some(99), limit: None }).await.unwrap().is_empty());
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_assign_dense_ids() {
  let s = store();
  register(&s, "alice").await;

  let handles: Vec<_> = (0..50)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.create_record(mentor(), task("alice", 1)).await })
    })
    .collect();

  let mut ids = Vec::new();
  for h in handles {
    ids.push(h.await.unwrap().unwrap().record_id);
  }
  ids.sort_unstable();
  assert_eq!(ids, (0..50).collect::<Vec<u64>>());
  assert_eq!(s.record_count().await.unwrap(), 50);
  assert_eq!(s.records_for(id("alice")).await.unwrap().len(), 50);
}
