//! Student session state machine.
//!
//! A student's progress through rounds and attempts is an immutable value:
//! every transition returns a new state instead of mutating in place, which
//! makes the transition logic unit-testable without any mocks and lets the
//! store layer do optimistic versioning on whole values.

pub mod state;

pub use state::{RoundRecord, SessionStatus, StudentSessionState};
