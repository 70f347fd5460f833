//! In-process TOTP validator over enrolled per-device secrets.

use rollcall_crypto::validate_code;
use rollcall_store::TotpValidator;
use rollcall_types::StudentId;
use rollcall_utils::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Validates one-time codes against secrets enrolled at device pairing.
///
/// An unknown student and a wrong code both come back `false`; the trait
/// contract forbids leaking enrollment status.
pub struct EnrolledTotpValidator {
    clock: Arc<dyn Clock>,
    secrets: Mutex<HashMap<StudentId, Vec<u8>>>,
}

impl EnrolledTotpValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            secrets: Mutex::new(HashMap::new()),
        }
    }

    pub fn enroll(&self, student: StudentId, secret: Vec<u8>) {
        self.secrets
            .lock()
            .expect("totp secrets lock poisoned")
            .insert(student, secret);
    }

    pub fn revoke(&self, student: StudentId) {
        self.secrets
            .lock()
            .expect("totp secrets lock poisoned")
            .remove(&student);
    }
}

impl TotpValidator for EnrolledTotpValidator {
    fn validate(&self, student: StudentId, code: &str) -> bool {
        let secrets = self.secrets.lock().expect("totp secrets lock poisoned");
        let Some(secret) = secrets.get(&student) else {
            return false;
        };
        validate_code(secret, code, self.clock.now().as_millis())
    }
}
