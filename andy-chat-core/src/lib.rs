//! Core types for andy-chat
//!
//! This crate holds the conversation session state machine together with
//! the configuration and logging plumbing shared by the client and the CLI.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
pub use session::{Author, Outcome, PendingQuestion, Resolution, Session, SessionState, Turn};
