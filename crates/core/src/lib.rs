#![forbid(unsafe_code)]

pub mod model;
pub mod session;

pub use session::{GradeOutcome, SessionError, SessionPhase, StudySession};
