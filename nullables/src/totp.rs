//! One-time code validator double.

use rollcall_store::TotpValidator;
use rollcall_types::StudentId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Accepts a fixed code per enrolled student; everything else is rejected.
///
/// Like the production validator, an unenrolled student and a wrong code
/// are indistinguishable to callers.
pub struct NullTotp {
    codes: Mutex<HashMap<StudentId, String>>,
}

impl NullTotp {
    /// No devices enrolled; every code is rejected.
    pub fn rejecting() -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
        }
    }

    /// One student enrolled with a fixed valid code.
    pub fn accepting(student: StudentId, code: &str) -> Self {
        let totp = Self::rejecting();
        totp.enroll(student, code);
        totp
    }

    pub fn enroll(&self, student: StudentId, code: &str) {
        self.codes
            .lock()
            .expect("code registry lock poisoned")
            .insert(student, code.to_string());
    }
}

impl TotpValidator for NullTotp {
    fn validate(&self, student: StudentId, code: &str) -> bool {
        self.codes
            .lock()
            .expect("code registry lock poisoned")
            .get(&student)
            .is_some_and(|expected| expected == code)
    }
}
