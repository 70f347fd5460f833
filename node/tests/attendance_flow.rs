//! End-to-end attendance flows against the in-memory store.

use rollcall_node::{AttendanceService, FailOutcome, IssuedQr, ScanOutcome, ServiceDeps};
use rollcall_nullables::{NullClock, NullKeyLookup, NullTotp, RecordingAudit};
use rollcall_store_memory::MemoryStore;
use rollcall_store::PoolStore;
use rollcall_types::{SessionId, SessionParams, StudentId, Verdict};
use rollcall_validation::{ScanRequest, ValidationCode};
use std::sync::Arc;

const TOTP: &str = "246810";

fn key_for(student: StudentId) -> [u8; 32] {
    [student.as_u64() as u8 ^ 0x5a; 32]
}

struct Harness {
    clock: Arc<NullClock>,
    store: Arc<MemoryStore>,
    keys: Arc<NullKeyLookup>,
    totp: Arc<NullTotp>,
    audit: Arc<RecordingAudit>,
    service: AttendanceService,
    session: SessionId,
}

fn harness() -> Harness {
    harness_with(SessionParams::default(), RecordingAudit::new())
}

fn harness_with(params: SessionParams, audit: RecordingAudit) -> Harness {
    let clock = Arc::new(NullClock::new(100_000));
    let store = Arc::new(MemoryStore::with_clock(clock.clone()));
    let keys = Arc::new(NullKeyLookup::empty());
    let totp = Arc::new(NullTotp::rejecting());
    let audit = Arc::new(audit);

    let deps = ServiceDeps {
        clock: clock.clone(),
        qr: store.clone(),
        students: store.clone(),
        pool: store.clone(),
        keys: keys.clone(),
        totp: totp.clone(),
        audit: audit.clone(),
    };
    let service = AttendanceService::new(deps, params, None);

    Harness {
        clock,
        store,
        keys,
        totp,
        audit,
        service,
        session: SessionId::new("cs101-2026-08-29"),
    }
}

impl Harness {
    fn enroll(&self, student: StudentId) -> IssuedQr {
        self.keys.enroll(student, key_for(student));
        self.totp.enroll(student, TOTP);
        self.service
            .register_student(&self.session, student)
            .expect("registration should succeed")
    }

    fn scan(&self, student: StudentId, qr: &IssuedQr, totp: Option<&str>) -> ScanOutcome {
        self.service.submit_scan(ScanRequest {
            session_id: self.session.clone(),
            claimed_student_id: student,
            encrypted_payload: qr.encrypted.clone(),
            totp_code: totp.map(str::to_string),
        })
    }
}

fn rejection_code(outcome: &ScanOutcome) -> Option<ValidationCode> {
    match outcome {
        ScanOutcome::Rejected { failure, .. } => Some(failure.code),
        _ => None,
    }
}

#[test]
fn full_session_completes_with_plausible_timing() {
    let h = harness();
    let student = StudentId::new(42);
    let qr1 = h.enroll(student);
    assert_eq!(qr1.round, 1);

    h.clock.advance(1_500);
    let qr2 = match h.scan(student, &qr1, None) {
        ScanOutcome::RoundAccepted {
            completed_round,
            response_time_ms,
            next,
        } => {
            assert_eq!(completed_round, 1);
            assert_eq!(response_time_ms, 1_500);
            assert_eq!(next.round, 2);
            next
        }
        other => panic!("round 1 rejected: {other:?}"),
    };

    h.clock.advance(1_800);
    let qr3 = match h.scan(student, &qr2, None) {
        ScanOutcome::RoundAccepted { next, .. } => next,
        other => panic!("round 2 rejected: {other:?}"),
    };
    assert_eq!(qr3.round, 3);

    h.clock.advance(2_000);
    match h.scan(student, &qr3, Some(TOTP)) {
        ScanOutcome::Completed { stats, verdict } => {
            assert_eq!(stats.min, 1_500);
            assert_eq!(stats.max, 2_000);
            assert!(stats.certainty >= 70, "certainty {}", stats.certainty);
            assert_eq!(verdict, Verdict::Present);
        }
        other => panic!("completion rejected: {other:?}"),
    }

    // One audit record per round, one final result with the verdict.
    assert_eq!(h.audit.rounds().len(), 3);
    let results = h.audit.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].verdict, Some(Verdict::Present));
    assert!(results[0].certainty.unwrap() >= 70);
}

#[test]
fn robotic_timing_is_doubtful() {
    let h = harness();
    let student = StudentId::new(7);
    let mut qr = h.enroll(student);

    // Scans landing 100ms after issuance, every round.
    for _ in 0..2 {
        h.clock.advance(100);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }
    h.clock.advance(100);
    match h.scan(student, &qr, Some(TOTP)) {
        ScanOutcome::Completed { stats, verdict } => {
            assert!(stats.certainty < 70, "certainty {}", stats.certainty);
            assert_eq!(verdict, Verdict::Doubtful);
        }
        other => panic!("rejected: {other:?}"),
    }
}

#[test]
fn qr_cannot_be_consumed_twice() {
    let h = harness();
    let student = StudentId::new(1);
    let qr = h.enroll(student);

    h.clock.advance(1_000);
    assert!(matches!(
        h.scan(student, &qr, None),
        ScanOutcome::RoundAccepted { .. }
    ));

    let replay = h.scan(student, &qr, None);
    // The original record was superseded by the round-2 issue, so the
    // replayed nonce reads as gone.
    let code = rejection_code(&replay).unwrap();
    assert!(
        code == ValidationCode::PayloadAlreadyConsumed || code == ValidationCode::PayloadExpired,
        "unexpected code {code:?}"
    );
}

#[test]
fn expired_qr_is_rejected() {
    let h = harness();
    let student = StudentId::new(2);
    let qr = h.enroll(student);

    h.clock.advance(121_000); // past the 120s TTL
    let outcome = h.scan(student, &qr, None);
    assert_eq!(rejection_code(&outcome), Some(ValidationCode::PayloadExpired));
}

#[test]
fn scanning_someone_elses_qr_is_rejected() {
    let h = harness();
    let alice = StudentId::new(10);
    let mallory = StudentId::new(11);
    let alice_qr = h.enroll(alice);
    h.enroll(mallory);

    h.clock.advance(500);
    let outcome = h.scan(mallory, &alice_qr, None);
    // Mallory's key cannot open Alice's envelope.
    assert_eq!(
        rejection_code(&outcome),
        Some(ValidationCode::DecryptionFailed)
    );

    // Even with Alice's key (a shared device), the embedded id gives the
    // substitution away.
    h.keys.enroll(mallory, key_for(alice));
    let outcome = h.scan(mallory, &alice_qr, None);
    assert_eq!(rejection_code(&outcome), Some(ValidationCode::UserMismatch));
}

#[test]
fn completion_without_totp_is_rejected() {
    let h = harness();
    let student = StudentId::new(3);
    let mut qr = h.enroll(student);

    for _ in 0..2 {
        h.clock.advance(1_000);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }

    h.clock.advance(1_000);
    let outcome = h.scan(student, &qr, None);
    assert_eq!(rejection_code(&outcome), Some(ValidationCode::TotpMissing));

    // The challenge survives the rejection and the right code completes it.
    let outcome = h.scan(student, &qr, Some(TOTP));
    assert!(matches!(outcome, ScanOutcome::Completed { .. }));
}

#[test]
fn wrong_totp_does_not_consume_the_qr() {
    let h = harness();
    let student = StudentId::new(4);
    let mut qr = h.enroll(student);

    for _ in 0..2 {
        h.clock.advance(1_000);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }

    h.clock.advance(1_000);
    let outcome = h.scan(student, &qr, Some("000000"));
    assert_eq!(rejection_code(&outcome), Some(ValidationCode::TotpInvalid));

    let outcome = h.scan(student, &qr, Some(TOTP));
    assert!(matches!(outcome, ScanOutcome::Completed { .. }));
}

#[test]
fn failed_attempt_restarts_from_round_one() {
    let h = harness();
    let student = StudentId::new(5);
    let qr1 = h.enroll(student);

    // Pass round 1, then the host times the student out.
    h.clock.advance(1_000);
    let qr2 = match h.scan(student, &qr1, None) {
        ScanOutcome::RoundAccepted { next, .. } => next,
        other => panic!("rejected: {other:?}"),
    };
    assert_eq!(qr2.round, 2);

    let retry = match h.service.fail_round(&h.session, student).unwrap() {
        FailOutcome::Retrying { attempt, next } => {
            assert_eq!(attempt, 2);
            assert_eq!(next.round, 1);
            next
        }
        FailOutcome::Failed => panic!("first failure should allow a retry"),
    };

    // The timed-out challenge is dead.
    h.clock.advance(500);
    let stale = h.scan(student, &qr2, None);
    assert_eq!(rejection_code(&stale), Some(ValidationCode::PayloadExpired));

    // The fresh attempt can still run to completion.
    let mut qr = retry;
    for _ in 0..2 {
        h.clock.advance(1_200);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }
    h.clock.advance(1_200);
    assert!(matches!(
        h.scan(student, &qr, Some(TOTP)),
        ScanOutcome::Completed { .. }
    ));
}

#[test]
fn attempts_exhaust_into_a_terminal_failure() {
    let h = harness();
    let student = StudentId::new(6);
    let qr = h.enroll(student);

    match h.service.fail_round(&h.session, student).unwrap() {
        FailOutcome::Retrying { .. } => {}
        FailOutcome::Failed => panic!("one attempt should remain"),
    }
    match h.service.fail_round(&h.session, student).unwrap() {
        FailOutcome::Failed => {}
        FailOutcome::Retrying { .. } => panic!("attempts should be exhausted"),
    }

    // Terminal students get no new QRs and their old ones are gone.
    assert!(h.service.issue_qr(&h.session, student).is_err());
    h.clock.advance(100);
    let outcome = h.scan(student, &qr, None);
    assert_eq!(rejection_code(&outcome), Some(ValidationCode::PayloadExpired));

    // The failure is audited as a definitive absence.
    let results = h.audit.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].verdict, Some(Verdict::Absent));
    assert_eq!(results[0].certainty, Some(0));
}

#[test]
fn duplicate_registration_is_an_error() {
    let h = harness();
    let student = StudentId::new(8);
    h.enroll(student);
    assert!(h.service.register_student(&h.session, student).is_err());
}

#[test]
fn pool_entry_follows_the_student_through_rounds() {
    let h = harness();
    let student = StudentId::new(9);
    let qr1 = h.enroll(student);

    let entries = h.store.entries(&h.session).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].owner, Some(student));
    assert_eq!(entries[0].round, 1);
    assert_eq!(entries[0].ciphertext, qr1.encrypted);

    h.clock.advance(1_000);
    let qr2 = match h.scan(student, &qr1, None) {
        ScanOutcome::RoundAccepted { next, .. } => next,
        other => panic!("rejected: {other:?}"),
    };

    // Still exactly one entry, now carrying the round-2 ciphertext.
    let entries = h.store.entries(&h.session).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].round, 2);
    assert_eq!(entries[0].ciphertext, qr2.encrypted);
}

#[test]
fn completion_removes_the_pool_entry() {
    let h = harness();
    let student = StudentId::new(12);
    let mut qr = h.enroll(student);

    for _ in 0..2 {
        h.clock.advance(1_000);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }
    h.clock.advance(1_000);
    assert!(matches!(
        h.scan(student, &qr, Some(TOTP)),
        ScanOutcome::Completed { .. }
    ));

    assert!(h.store.entries(&h.session).unwrap().is_empty());
}

#[test]
fn fraud_counters_track_rejections() {
    let h = harness();
    let student = StudentId::new(13);
    let qr = h.enroll(student);

    h.clock.advance(121_000);
    let _ = h.scan(student, &qr, None);
    let _ = h.scan(student, &qr, None);

    let counts = h.service.fraud_counts();
    assert_eq!(counts["PAYLOAD_EXPIRED"], 2);
    assert_eq!(counts["TOTP_INVALID"], 0);
}

#[test]
fn audit_failures_never_block_attendance() {
    let h = harness_with(SessionParams::default(), RecordingAudit::failing());
    let student = StudentId::new(14);
    let mut qr = h.enroll(student);

    for _ in 0..2 {
        h.clock.advance(1_000);
        qr = match h.scan(student, &qr, None) {
            ScanOutcome::RoundAccepted { next, .. } => next,
            other => panic!("rejected: {other:?}"),
        };
    }
    h.clock.advance(1_000);
    assert!(matches!(
        h.scan(student, &qr, Some(TOTP)),
        ScanOutcome::Completed { .. }
    ));
}

#[test]
fn concurrent_scans_credit_the_round_exactly_once() {
    let h = Arc::new(harness());
    let student = StudentId::new(15);
    let qr = h.enroll(student);
    h.clock.advance(1_000);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let h = h.clone();
        let qr = qr.clone();
        handles.push(std::thread::spawn(move || {
            h.scan(student, &qr, None)
        }));
    }

    let outcomes: Vec<ScanOutcome> = handles
        .into_iter()
        .map(|j| j.join().expect("scan thread panicked"))
        .collect();

    let accepted = outcomes
        .iter()
        .filter(|o| matches!(o, ScanOutcome::RoundAccepted { .. }))
        .count();
    assert_eq!(accepted, 1, "outcomes: {outcomes:?}");

    // The winner advanced the student to round 2 exactly once.
    let state = rollcall_store::StudentStateStore::get(h.store.as_ref(), &h.session, student)
        .unwrap()
        .unwrap();
    assert_eq!(state.value.current_round, 2);
    assert_eq!(state.value.rounds_completed.len(), 1);
}
