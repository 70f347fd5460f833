//! Session-key lookup collaborator.

use crate::StoreError;
use rollcall_types::StudentId;

/// Looks up the per-student 32-byte symmetric session key.
///
/// Key derivation and device enrollment are external to the core; this is
/// the injection point for whatever provides them.
pub trait SessionKeyLookup: Send + Sync {
    fn find_by_user_id(&self, student: StudentId) -> Result<Option<[u8; 32]>, StoreError>;
}
