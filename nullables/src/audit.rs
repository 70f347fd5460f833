//! Audit sink double.

use rollcall_store::{AuditRecord, AuditSink, StoreError};
use std::sync::Mutex;

/// Records audit writes in memory; can be configured to fail, which lets
/// tests prove the audit path is best-effort.
pub struct RecordingAudit {
    rounds: Mutex<Vec<AuditRecord>>,
    results: Mutex<Vec<AuditRecord>>,
    fail: bool,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self {
            rounds: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn rounds(&self) -> Vec<AuditRecord> {
        self.rounds.lock().expect("audit lock poisoned").clone()
    }

    pub fn results(&self) -> Vec<AuditRecord> {
        self.results.lock().expect("audit lock poisoned").clone()
    }
}

impl Default for RecordingAudit {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for RecordingAudit {
    fn record_round(&self, record: &AuditRecord) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Backend("audit sink unavailable".to_string()));
        }
        self.rounds
            .lock()
            .expect("audit lock poisoned")
            .push(record.clone());
        Ok(())
    }

    fn record_result(&self, record: &AuditRecord) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Backend("audit sink unavailable".to_string()));
        }
        self.results
            .lock()
            .expect("audit lock poisoned")
            .push(record.clone());
        Ok(())
    }
}
