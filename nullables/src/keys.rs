//! Session key lookup double.

use rollcall_store::{SessionKeyLookup, StoreError};
use rollcall_types::StudentId;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory key registry.
pub struct NullKeyLookup {
    keys: Mutex<HashMap<StudentId, [u8; 32]>>,
    fail: bool,
}

impl NullKeyLookup {
    /// No keys enrolled.
    pub fn empty() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    /// One student enrolled with the given key.
    pub fn with_key(student: StudentId, key: [u8; 32]) -> Self {
        let lookup = Self::empty();
        lookup.enroll(student, key);
        lookup
    }

    /// Every lookup returns a backend error.
    pub fn failing() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn enroll(&self, student: StudentId, key: [u8; 32]) {
        self.keys
            .lock()
            .expect("key registry lock poisoned")
            .insert(student, key);
    }
}

impl SessionKeyLookup for NullKeyLookup {
    fn find_by_user_id(&self, student: StudentId) -> Result<Option<[u8; 32]>, StoreError> {
        if self.fail {
            return Err(StoreError::Backend("key lookup unavailable".to_string()));
        }
        Ok(self
            .keys
            .lock()
            .expect("key registry lock poisoned")
            .get(&student)
            .copied())
    }
}
