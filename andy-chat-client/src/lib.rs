//! Answer service client for andy-chat
//!
//! This crate speaks the answer service HTTP contract and drives a
//! conversation session against it.

pub mod base;
pub mod conversation;
pub mod http;

pub use base::{
    dispatch, AnswerService, ChatReply, ChatRequest, HealthReport, ServiceError, ServiceResult,
};
pub use conversation::{Conversation, Dispatcher};
pub use http::HttpAnswerService;
