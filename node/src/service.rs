//! The attendance service: the node's write path.
//!
//! Owns registration, QR issuance, scan handling and round/attempt
//! progression. All state lives behind the store traits; the service holds
//! no per-student state of its own, so concurrent calls coordinate purely
//! through the store's atomic consume and compare-and-put operations.

use crate::NodeError;
use rollcall_crypto::{encrypt, generate_nonce};
use rollcall_projection::ProjectionOrchestrator;
use rollcall_pool::PoolBalancer;
use rollcall_scoring::{calculate_stats, ResponseTimeStats};
use rollcall_session::StudentSessionState;
use rollcall_store::{
    AuditRecord, AuditSink, DisplaySink, PoolEntry, PoolStore, QrStore, SessionKeyLookup,
    StoreError, StoredPayload, StudentStateStore, TotpValidator,
};
use rollcall_types::{QrPayload, SessionId, SessionParams, StudentId, Timestamp, Verdict};
use rollcall_utils::{Clock, StatsCounter};
use rollcall_validation::{
    completion_pipeline, scan_pipeline, PipelineDeps, ScanRequest, ValidationCode,
    ValidationContext, ValidationFailure,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Everything the service talks to.
#[derive(Clone)]
pub struct ServiceDeps {
    pub clock: Arc<dyn Clock>,
    pub qr: Arc<dyn QrStore>,
    pub students: Arc<dyn StudentStateStore>,
    pub pool: Arc<dyn PoolStore>,
    pub keys: Arc<dyn SessionKeyLookup>,
    pub totp: Arc<dyn TotpValidator>,
    pub audit: Arc<dyn AuditSink>,
}

/// A freshly issued QR challenge, ready to hand to the display.
#[derive(Clone, Debug)]
pub struct IssuedQr {
    pub nonce: String,
    pub round: u32,
    /// Envelope wire form.
    pub encrypted: String,
    pub ttl_secs: u64,
}

/// Outcome of one scan submission.
#[derive(Debug)]
pub enum ScanOutcome {
    /// A non-final round was credited; the next challenge is already live.
    RoundAccepted {
        completed_round: u32,
        response_time_ms: u64,
        next: IssuedQr,
    },
    /// The final round was credited; attendance is decided.
    Completed {
        stats: ResponseTimeStats,
        verdict: Verdict,
    },
    /// The scan was rejected. Expected outcome, not an error.
    Rejected {
        failure: ValidationFailure,
        failed_at_stage: Option<&'static str>,
    },
}

/// Outcome of burning an attempt (host-triggered timeout or give-up).
#[derive(Debug)]
pub enum FailOutcome {
    /// A fresh attempt started from round 1.
    Retrying { attempt: u32, next: IssuedQr },
    /// Attempts exhausted; the student is out.
    Failed,
}

pub struct AttendanceService {
    deps: ServiceDeps,
    params: SessionParams,
    fallback_key: Option<[u8; 32]>,
    fraud: StatsCounter,
}

impl AttendanceService {
    pub fn new(
        deps: ServiceDeps,
        params: SessionParams,
        fallback_key: Option<[u8; 32]>,
    ) -> Self {
        let code_names: Vec<&'static str> =
            ValidationCode::ALL.iter().map(|c| c.as_str()).collect();
        Self {
            deps,
            params,
            fallback_key,
            fraud: StatsCounter::new(&code_names),
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Rejected-scan counts per failure code since startup.
    pub fn fraud_counts(&self) -> HashMap<&'static str, u64> {
        self.fraud.snapshot()
    }

    /// Register a student into a session and issue their round-1 challenge.
    pub fn register_student(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<IssuedQr, NodeError> {
        let now = self.deps.clock.now();
        let state = StudentSessionState::register(student, session.clone(), &self.params, now);

        match self.deps.students.insert(state) {
            Ok(_) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(NodeError::AlreadyRegistered(
                    student.as_u64(),
                    session.as_str().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(session = %session, student = %student, "student registered");
        self.issue_qr(session, student)
    }

    /// Issue (or re-issue) the student's challenge for their current round.
    ///
    /// Replaces the previous QR record and pool entry; at most one live
    /// challenge exists per student at any time.
    pub fn issue_qr(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<IssuedQr, NodeError> {
        let now = self.deps.clock.now();
        let versioned = self
            .deps
            .students
            .get(session, student)?
            .ok_or_else(|| {
                NodeError::NotRegistered(student.as_u64(), session.as_str().to_string())
            })?;
        if versioned.value.is_terminal() {
            return Err(NodeError::NotActive(student.as_u64()));
        }

        let key = match self.deps.keys.find_by_user_id(student)? {
            Some(key) => key,
            None => self
                .fallback_key
                .ok_or(NodeError::NoSessionKey(student.as_u64()))?,
        };

        let round = versioned.value.current_round;
        let nonce = generate_nonce();
        let payload = QrPayload {
            version: rollcall_types::PAYLOAD_VERSION,
            session_id: session.clone(),
            student_id: student,
            round,
            issued_at: now,
            nonce: nonce.clone(),
        };
        let wire = encrypt(&key, payload.to_json().as_bytes()).to_string();

        self.deps.qr.put(
            StoredPayload::new(payload, wire.clone(), now),
            self.params.qr_ttl_secs,
        )?;

        // The superseded challenge, if any, dies with the re-issue.
        if let Some(old_nonce) = versioned.value.active_nonce.clone() {
            if let Err(e) = self.deps.qr.remove(&old_nonce) {
                tracing::warn!(error = %e, "failed to drop superseded QR record");
            }
        }

        let rebound = versioned.value.with_active_qr(nonce.clone(), now);
        self.deps.students.compare_and_put(rebound, versioned.version)?;

        self.deps.pool.replace_student_entry(PoolEntry {
            session_id: session.clone(),
            owner: Some(student),
            ciphertext: wire.clone(),
            round,
        })?;

        tracing::debug!(session = %session, student = %student, round, "QR issued");
        Ok(IssuedQr {
            nonce,
            round,
            encrypted: wire,
            ttl_secs: self.params.qr_ttl_secs,
        })
    }

    /// Handle one scan submission end to end.
    ///
    /// Validation runs first; on success the QR is atomically consumed and
    /// the student's state advanced under optimistic concurrency. Either a
    /// competing submission wins cleanly or this one does; a round can
    /// never be credited twice.
    pub fn submit_scan(&self, request: ScanRequest) -> ScanOutcome {
        let now = self.deps.clock.now();

        let pipeline = if self.is_final_round(&request) {
            completion_pipeline(&self.pipeline_deps())
        } else {
            scan_pipeline(&self.pipeline_deps())
        };

        let mut ctx = ValidationContext::new(request, now);
        if !pipeline.run(&mut ctx) {
            return self.reject(ctx);
        }

        // Validation passed; the context is guaranteed to hold these.
        let Some(payload) = ctx.payload.clone() else {
            return self.internal_rejection("payload missing after validation");
        };
        let Some(versioned) = ctx.student_versioned() else {
            return self.internal_rejection("student state missing after validation");
        };
        let student = payload.student_id;
        let session = payload.session_id.clone();

        // Critical path: exactly one submission may consume the QR.
        match self.deps.qr.mark_consumed(&payload.nonce, student, now) {
            Ok(()) => {}
            Err(StoreError::AlreadyConsumed(_)) => {
                self.fraud.increment(ValidationCode::PayloadAlreadyConsumed.as_str());
                return ScanOutcome::Rejected {
                    failure: ValidationFailure::new(
                        ValidationCode::PayloadAlreadyConsumed,
                        "QR was already used",
                    ),
                    failed_at_stage: None,
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "QR consumption failed");
                return self.internal_rejection("QR consumption failed");
            }
        }

        let issued_at = versioned
            .value
            .qr_issued_at
            .unwrap_or(payload.issued_at);
        let response_time_ms = issued_at.elapsed_since(now);

        let (advanced, is_complete) = versioned.value.complete_round(response_time_ms, now);
        match self
            .deps
            .students
            .compare_and_put(advanced.clone(), versioned.version)
        {
            Ok(_) => {}
            Err(StoreError::VersionConflict { .. }) => {
                // A competing submission advanced the state first; it won.
                tracing::warn!(session = %session, student = %student, "concurrent scan lost the state race");
                return self.internal_rejection("concurrent update");
            }
            Err(e) => {
                tracing::error!(error = %e, "state advance failed");
                return self.internal_rejection("state advance failed");
            }
        }

        self.audit_round(&session, student, &advanced, response_time_ms, now);

        if is_complete {
            let stats = calculate_stats(&advanced.response_times());
            let verdict = Verdict::from_certainty(stats.certainty);
            tracing::info!(
                session = %session,
                student = %student,
                certainty = stats.certainty,
                %verdict,
                "attendance completed"
            );
            self.audit_result(&session, student, &advanced, &stats, verdict, now);
            self.drop_pool_entry(&session, student);
            ScanOutcome::Completed { stats, verdict }
        } else {
            let completed_round = advanced
                .rounds_completed
                .last()
                .map(|r| r.round)
                .unwrap_or(0);
            match self.issue_qr(&session, student) {
                Ok(next) => ScanOutcome::RoundAccepted {
                    completed_round,
                    response_time_ms,
                    next,
                },
                Err(e) => {
                    tracing::error!(error = %e, "next-round issuance failed");
                    self.internal_rejection("next-round issuance failed")
                }
            }
        }
    }

    /// Burn the student's current attempt (timeout or host action).
    pub fn fail_round(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<FailOutcome, NodeError> {
        let now = self.deps.clock.now();
        let versioned = self
            .deps
            .students
            .get(session, student)?
            .ok_or_else(|| {
                NodeError::NotRegistered(student.as_u64(), session.as_str().to_string())
            })?;
        if versioned.value.is_terminal() {
            return Err(NodeError::NotActive(student.as_u64()));
        }

        if let Some(old_nonce) = versioned.value.active_nonce.clone() {
            if let Err(e) = self.deps.qr.remove(&old_nonce) {
                tracing::warn!(error = %e, "failed to drop QR record on round failure");
            }
        }

        let (failed, can_retry) = versioned.value.fail_round(now);
        self.deps
            .students
            .compare_and_put(failed.clone(), versioned.version)?;

        if can_retry {
            tracing::info!(
                session = %session,
                student = %student,
                attempt = failed.current_attempt,
                "attempt restarted"
            );
            let next = self.issue_qr(session, student)?;
            Ok(FailOutcome::Retrying {
                attempt: failed.current_attempt,
                next,
            })
        } else {
            tracing::info!(session = %session, student = %student, "attempts exhausted");
            self.drop_pool_entry(session, student);
            let record = AuditRecord {
                session_id: session.clone(),
                student_id: student,
                round: failed.current_round,
                response_time_ms: 0,
                validated_at: now,
                certainty: Some(0),
                verdict: Some(Verdict::Absent),
            };
            if let Err(e) = self.deps.audit.record_result(&record) {
                tracing::warn!(error = %e, "audit result write failed");
            }
            Ok(FailOutcome::Failed)
        }
    }

    /// Build the projection lifecycle for a session's display.
    pub fn projection(
        &self,
        session: SessionId,
        sink: Arc<dyn DisplaySink>,
        stop: Arc<AtomicBool>,
    ) -> ProjectionOrchestrator {
        let balancer = PoolBalancer::new(
            self.deps.pool.clone(),
            self.deps.clock.clone(),
            self.params.clone(),
        );
        ProjectionOrchestrator::new(
            session,
            self.params.clone(),
            self.deps.pool.clone(),
            balancer,
            sink,
            stop,
        )
    }

    fn pipeline_deps(&self) -> PipelineDeps {
        PipelineDeps {
            keys: self.deps.keys.clone(),
            fallback_key: self.fallback_key,
            qr: self.deps.qr.clone(),
            students: self.deps.students.clone(),
            totp: self.deps.totp.clone(),
        }
    }

    /// A scan completes attendance when the student sits on the last round.
    fn is_final_round(&self, request: &ScanRequest) -> bool {
        match self
            .deps
            .students
            .get(&request.session_id, request.claimed_student_id)
        {
            Ok(Some(v)) => v.value.current_round == v.value.max_rounds,
            _ => false,
        }
    }

    fn reject(&self, ctx: ValidationContext) -> ScanOutcome {
        let failure = ctx.failure.unwrap_or_else(|| {
            ValidationFailure::new(ValidationCode::InternalError, "failure missing")
        });
        self.fraud.increment(failure.code.as_str());
        ScanOutcome::Rejected {
            failure,
            failed_at_stage: ctx.failed_at_stage,
        }
    }

    fn internal_rejection(&self, message: &str) -> ScanOutcome {
        self.fraud.increment(ValidationCode::InternalError.as_str());
        ScanOutcome::Rejected {
            failure: ValidationFailure::new(ValidationCode::InternalError, message),
            failed_at_stage: None,
        }
    }

    fn audit_round(
        &self,
        session: &SessionId,
        student: StudentId,
        state: &StudentSessionState,
        response_time_ms: u64,
        now: Timestamp,
    ) {
        let record = AuditRecord {
            session_id: session.clone(),
            student_id: student,
            round: state.rounds_completed.last().map(|r| r.round).unwrap_or(0),
            response_time_ms,
            validated_at: now,
            certainty: None,
            verdict: None,
        };
        if let Err(e) = self.deps.audit.record_round(&record) {
            tracing::warn!(error = %e, "audit round write failed");
        }
    }

    fn audit_result(
        &self,
        session: &SessionId,
        student: StudentId,
        state: &StudentSessionState,
        stats: &ResponseTimeStats,
        verdict: Verdict,
        now: Timestamp,
    ) {
        let record = AuditRecord {
            session_id: session.clone(),
            student_id: student,
            round: state.max_rounds,
            response_time_ms: stats.avg.round() as u64,
            validated_at: now,
            certainty: Some(stats.certainty),
            verdict: Some(verdict),
        };
        if let Err(e) = self.deps.audit.record_result(&record) {
            tracing::warn!(error = %e, "audit result write failed");
        }
    }

    fn drop_pool_entry(&self, session: &SessionId, student: StudentId) {
        if let Err(e) = self.deps.pool.remove_student_entry(session, student) {
            tracing::warn!(error = %e, "failed to remove pool entry");
        }
    }
}
