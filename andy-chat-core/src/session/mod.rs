//! Conversation session state
//!
//! A session holds the ordered chat turns of one run together with the
//! draft input and the busy flag that gates resubmission. It never talks to
//! the network itself: `submit` hands out a [`PendingQuestion`] ticket and the
//! caller feeds the outcome back through `resolve`.

pub mod machine;
pub mod turn;

pub use machine::{Outcome, PendingQuestion, Resolution, Session, SessionState};
pub use turn::{Author, Turn};

/// Text of the assistant turn every session starts with
pub const SEED_GREETING: &str = "What would you like to know about Andy?";
