//! Stages 4 and 7: state lookups against the ephemeral store.
//!
//! Both normalize absence to a value (`Missing` / `Unregistered`) rather
//! than an error; the pure stages that follow turn absence into the right
//! failure code.

use crate::context::{QrLookup, StudentLookup, ValidationContext};
use crate::stages::Stage;
use rollcall_store::{QrStore, StudentStateStore};
use std::sync::Arc;

/// Fetch the QR record for the payload's nonce.
pub struct LoadQrState {
    qr: Arc<dyn QrStore>,
}

impl LoadQrState {
    pub fn new(qr: Arc<dyn QrStore>) -> Self {
        Self { qr }
    }
}

impl Stage for LoadQrState {
    fn name(&self) -> &'static str {
        "load_qr_state"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let Some(payload) = ctx.payload_or_fail() else {
            return Ok(false);
        };
        let lookup = match self.qr.get(&payload.nonce)? {
            Some(record) => QrLookup::Found(record),
            None => QrLookup::Missing,
        };
        ctx.qr_state = Some(lookup);
        Ok(true)
    }
}

/// Fetch the student's session state.
pub struct LoadStudentState {
    students: Arc<dyn StudentStateStore>,
}

impl LoadStudentState {
    pub fn new(students: Arc<dyn StudentStateStore>) -> Self {
        Self { students }
    }
}

impl Stage for LoadStudentState {
    fn name(&self) -> &'static str {
        "load_student_state"
    }

    fn run(&self, ctx: &mut ValidationContext) -> anyhow::Result<bool> {
        let session = ctx.request.session_id.clone();
        let student = ctx.request.claimed_student_id;
        let lookup = match self.students.get(&session, student)? {
            Some(versioned) => StudentLookup::Registered(versioned),
            None => StudentLookup::Unregistered,
        };
        ctx.student_state = Some(lookup);
        Ok(true)
    }
}
