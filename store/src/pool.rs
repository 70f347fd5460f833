//! Display pool storage trait.

use crate::StoreError;
use rollcall_types::{SessionId, StudentId};
use serde::{Deserialize, Serialize};

/// One entry in a session's display pool.
///
/// `owner == None` marks a decoy. By construction decoys are
/// indistinguishable from real entries by ciphertext shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub session_id: SessionId,
    pub owner: Option<StudentId>,
    /// Envelope wire form shown on the display.
    pub ciphertext: String,
    pub round: u32,
}

impl PoolEntry {
    pub fn is_decoy(&self) -> bool {
        self.owner.is_none()
    }
}

/// Current pool composition for one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub total: usize,
    pub students: usize,
    pub fakes: usize,
}

/// Trait for the per-session display pool.
///
/// Real entries are managed by the attendance service (one per student at a
/// time); decoys are owned exclusively by the balancer.
pub trait PoolStore: Send + Sync {
    /// Add an entry (real or decoy).
    fn add(&self, entry: PoolEntry) -> Result<(), StoreError>;

    /// Snapshot of all entries for a session.
    fn entries(&self, session: &SessionId) -> Result<Vec<PoolEntry>, StoreError>;

    /// Composition counts for a session.
    fn stats(&self, session: &SessionId) -> Result<PoolStats, StoreError>;

    /// Remove up to `count` decoys; returns how many were removed.
    fn remove_decoys(&self, session: &SessionId, count: usize) -> Result<usize, StoreError>;

    /// Add or replace the single entry owned by `entry.owner`.
    ///
    /// The owner must be set; a student never has two live pool entries.
    fn replace_student_entry(&self, entry: PoolEntry) -> Result<(), StoreError>;

    /// Remove a student's entry (on completion or failure). No-op if absent.
    fn remove_student_entry(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<(), StoreError>;

    /// Drop every entry for a session (session teardown).
    fn clear_session(&self, session: &SessionId) -> Result<(), StoreError>;
}
