//! Per-student session state and its pure transitions.

use rollcall_types::{SessionId, SessionParams, StudentId, Timestamp};
use serde::{Deserialize, Serialize};

/// Where a student stands in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Working through rounds; retries possible.
    Active,
    /// All rounds passed. Terminal.
    Completed,
    /// Attempts exhausted. Terminal.
    Failed,
}

/// One completed challenge round and how long the student took to answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub response_time_ms: u64,
}

/// A student's progress through one session.
///
/// Replaced wholesale on every transition; no in-place mutation. Callers
/// must check `status` before invoking a transition — transitions are not
/// defined on terminal states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSessionState {
    pub student_id: StudentId,
    pub session_id: SessionId,
    /// 1-based round the student is currently on.
    pub current_round: u32,
    pub max_rounds: u32,
    pub rounds_completed: Vec<RoundRecord>,
    /// 1-based attempt counter.
    pub current_attempt: u32,
    pub max_attempts: u32,
    /// Nonce of the QR currently issued to this student, if any.
    pub active_nonce: Option<String>,
    /// When the active QR was issued (for response-time measurement).
    pub qr_issued_at: Option<Timestamp>,
    pub status: SessionStatus,
    pub registered_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StudentSessionState {
    /// Fresh state at registration: round 1, attempt 1, active.
    pub fn register(
        student_id: StudentId,
        session_id: SessionId,
        params: &SessionParams,
        now: Timestamp,
    ) -> Self {
        Self {
            student_id,
            session_id,
            current_round: 1,
            max_rounds: params.max_rounds,
            rounds_completed: Vec::new(),
            current_attempt: 1,
            max_attempts: params.max_attempts,
            active_nonce: None,
            qr_issued_at: None,
            status: SessionStatus::Active,
            registered_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != SessionStatus::Active
    }

    /// Record a passed round.
    ///
    /// Appends the round record, clears the active QR, and either advances
    /// `current_round` or — on the final round — sets `Completed` while
    /// leaving `current_round` unchanged. Returns `(new_state, is_complete)`.
    pub fn complete_round(&self, response_time_ms: u64, now: Timestamp) -> (Self, bool) {
        debug_assert_eq!(self.status, SessionStatus::Active);

        let mut next = self.clone();
        next.rounds_completed.push(RoundRecord {
            round: self.current_round,
            response_time_ms,
        });
        next.active_nonce = None;
        next.qr_issued_at = None;
        next.updated_at = now;

        let is_complete = self.current_round == self.max_rounds;
        if is_complete {
            next.status = SessionStatus::Completed;
        } else {
            next.current_round += 1;
        }
        (next, is_complete)
    }

    /// Record a failed round.
    ///
    /// If attempts remain, the whole round sequence restarts: attempt
    /// counter bumps, `current_round` resets to 1, completed rounds are
    /// discarded, status stays `Active`. Otherwise status becomes `Failed`
    /// permanently. Returns `(new_state, can_retry)`.
    pub fn fail_round(&self, now: Timestamp) -> (Self, bool) {
        debug_assert_eq!(self.status, SessionStatus::Active);

        let mut next = self.clone();
        next.active_nonce = None;
        next.qr_issued_at = None;
        next.updated_at = now;

        let can_retry = self.current_attempt < self.max_attempts;
        if can_retry {
            next.current_attempt += 1;
            next.current_round = 1;
            next.rounds_completed.clear();
        } else {
            next.status = SessionStatus::Failed;
        }
        (next, can_retry)
    }

    /// Attach the nonce and issue time of a freshly issued QR.
    ///
    /// Round and attempt counters are untouched.
    pub fn with_active_qr(&self, nonce: String, issued_at: Timestamp) -> Self {
        let mut next = self.clone();
        next.active_nonce = Some(nonce);
        next.qr_issued_at = Some(issued_at);
        next.updated_at = issued_at;
        next
    }

    /// Response times of all completed rounds, in order.
    pub fn response_times(&self) -> Vec<u64> {
        self.rounds_completed
            .iter()
            .map(|r| r.response_time_ms)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SessionParams {
        SessionParams {
            max_rounds: 3,
            max_attempts: 2,
            ..SessionParams::default()
        }
    }

    fn fresh() -> StudentSessionState {
        StudentSessionState::register(
            StudentId::new(7),
            SessionId::new("s1"),
            &params(),
            Timestamp::from_millis(1_000),
        )
    }

    fn now(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn registration_starts_at_round_one_active() {
        let state = fresh();
        assert_eq!(state.current_round, 1);
        assert_eq!(state.current_attempt, 1);
        assert_eq!(state.status, SessionStatus::Active);
        assert!(state.rounds_completed.is_empty());
        assert!(state.active_nonce.is_none());
    }

    #[test]
    fn complete_round_advances_until_final() {
        let state = fresh();

        let (state, done) = state.complete_round(1_500, now(2_000));
        assert!(!done);
        assert_eq!(state.current_round, 2);
        assert_eq!(state.status, SessionStatus::Active);

        let (state, done) = state.complete_round(1_800, now(3_000));
        assert!(!done);
        assert_eq!(state.current_round, 3);

        let (state, done) = state.complete_round(2_000, now(4_000));
        assert!(done);
        assert_eq!(state.status, SessionStatus::Completed);
        // Final round leaves current_round unchanged.
        assert_eq!(state.current_round, 3);
        assert_eq!(state.rounds_completed.len(), 3);
        assert_eq!(state.response_times(), vec![1_500, 1_800, 2_000]);
    }

    #[test]
    fn complete_round_clears_active_qr() {
        let state = fresh().with_active_qr("a".repeat(32), now(1_500));
        assert!(state.active_nonce.is_some());

        let (state, _) = state.complete_round(700, now(2_000));
        assert!(state.active_nonce.is_none());
        assert!(state.qr_issued_at.is_none());
    }

    #[test]
    fn fail_round_restarts_sequence_while_attempts_remain() {
        let state = fresh();
        let (state, _) = state.complete_round(900, now(2_000));
        assert_eq!(state.current_round, 2);

        let (state, can_retry) = state.fail_round(now(3_000));
        assert!(can_retry);
        assert_eq!(state.status, SessionStatus::Active);
        assert_eq!(state.current_attempt, 2);
        assert_eq!(state.current_round, 1);
        assert!(state.rounds_completed.is_empty());
    }

    #[test]
    fn fail_round_on_last_attempt_is_terminal() {
        let state = fresh();
        let (state, can_retry) = state.fail_round(now(2_000));
        assert!(can_retry);
        let (state, can_retry) = state.fail_round(now(3_000));
        assert!(!can_retry);
        assert_eq!(state.status, SessionStatus::Failed);
        assert!(state.is_terminal());
    }

    #[test]
    fn with_active_qr_touches_only_qr_fields() {
        let state = fresh();
        let bound = state.with_active_qr("0".repeat(32), now(5_000));
        assert_eq!(bound.current_round, state.current_round);
        assert_eq!(bound.current_attempt, state.current_attempt);
        assert_eq!(bound.active_nonce.as_deref(), Some("0".repeat(32).as_str()));
        assert_eq!(bound.qr_issued_at, Some(now(5_000)));
    }

    #[test]
    fn transitions_do_not_mutate_the_original() {
        let state = fresh();
        let snapshot = state.clone();
        let _ = state.complete_round(1_000, now(2_000));
        let _ = state.fail_round(now(2_000));
        let _ = state.with_active_qr("f".repeat(32), now(2_000));
        assert_eq!(state, snapshot);
    }
}
