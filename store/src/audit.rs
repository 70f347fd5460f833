//! Best-effort audit sink for durable round/result history.

use crate::StoreError;
use rollcall_types::{SessionId, StudentId, Timestamp, Verdict};
use serde::{Deserialize, Serialize};

/// A durable audit record. Per-round records carry no certainty/verdict;
/// the final-result record does.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub round: u32,
    pub response_time_ms: u64,
    pub validated_at: Timestamp,
    pub certainty: Option<u8>,
    pub verdict: Option<Verdict>,
}

/// Receives audit records outside the hot path.
///
/// Failures here must never fail or roll back an otherwise-successful
/// attendance transaction; callers catch, log, and move on.
pub trait AuditSink: Send + Sync {
    fn record_round(&self, record: &AuditRecord) -> Result<(), StoreError>;
    fn record_result(&self, record: &AuditRecord) -> Result<(), StoreError>;
}
