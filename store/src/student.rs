//! Versioned student-state storage trait.
//!
//! The state machine itself is pure; all contention lives at this boundary.
//! Writes are compare-and-swap on a version stamp so two concurrent
//! submissions for the same student cannot both advance the round.

use crate::StoreError;
use rollcall_session::StudentSessionState;
use rollcall_types::{SessionId, StudentId};
use serde::{Deserialize, Serialize};

/// A value paired with its store version stamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Trait for per-(session, student) state records.
pub trait StudentStateStore: Send + Sync {
    /// Fetch the current state, if the student is registered.
    fn get(
        &self,
        session: &SessionId,
        student: StudentId,
    ) -> Result<Option<Versioned<StudentSessionState>>, StoreError>;

    /// Insert a fresh registration. Fails with [`StoreError::Duplicate`]
    /// if the student already has state in this session.
    fn insert(
        &self,
        state: StudentSessionState,
    ) -> Result<Versioned<StudentSessionState>, StoreError>;

    /// Replace the state only if the stored version still matches
    /// `expected_version`; otherwise [`StoreError::VersionConflict`].
    fn compare_and_put(
        &self,
        state: StudentSessionState,
        expected_version: u64,
    ) -> Result<Versioned<StudentSessionState>, StoreError>;

    /// All states for a session (for host dashboards and final scoring).
    fn all_for_session(
        &self,
        session: &SessionId,
    ) -> Result<Vec<Versioned<StudentSessionState>>, StoreError>;
}
