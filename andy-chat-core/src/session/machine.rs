//! Session state machine

use super::turn::Turn;
use super::SEED_GREETING;
use tracing::debug;

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// Ticket for a question accepted by [`Session::submit`].
///
/// Exactly one request must be dispatched for each ticket, and the ticket is
/// handed back to [`Session::resolve`] together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    question: String,
    generation: u64,
}

impl PendingQuestion {
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Session generation this question was asked in
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Terminal result of one dispatched question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service answered with `success: true`
    Answered(String),
    /// The service answered with `success: false`
    Rejected(String),
    /// No usable reply could be obtained
    Unreachable(String),
}

impl Outcome {
    /// Text of the assistant turn rendered for this outcome
    pub fn into_text(self) -> String {
        match self {
            Outcome::Answered(response) => response,
            Outcome::Rejected(response) => format!("Error: {}", response),
            Outcome::Unreachable(detail) => format!("Network error: {}", detail),
        }
    }
}

/// What `resolve` did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An assistant turn was appended
    Appended,
    /// The question belonged to a generation superseded by `reset`
    Discarded,
}

/// In-memory conversation for one run
#[derive(Debug, Clone)]
pub struct Session {
    turns: Vec<Turn>,
    draft_input: String,
    busy: bool,
    generation: u64,
}

impl Session {
    /// Create a session holding only the seeded greeting
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(SEED_GREETING)],
            draft_input: String::new(),
            busy: false,
            generation: 0,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    pub fn set_draft_input(&mut self, text: impl Into<String>) {
        self.draft_input = text.into();
    }

    /// Mutable access to the draft for character-level editing
    pub fn draft_input_mut(&mut self) -> &mut String {
        &mut self.draft_input
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        if self.busy {
            SessionState::AwaitingResponse
        } else {
            SessionState::Idle
        }
    }

    /// Accept a question for dispatch.
    ///
    /// Returns `None` without touching the session when the text is blank or
    /// a question is already in flight.
    pub fn submit(&mut self, text: &str) -> Option<PendingQuestion> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }
        if self.busy {
            debug!("Ignoring submission while awaiting a response");
            return None;
        }

        self.turns.push(Turn::user(text));
        self.draft_input.clear();
        self.busy = true;
        debug!(generation = self.generation, "Question accepted");

        Some(PendingQuestion {
            question: text.to_string(),
            generation: self.generation,
        })
    }

    /// Submit whatever is currently in the draft input
    pub fn submit_draft(&mut self) -> Option<PendingQuestion> {
        let text = self.draft_input.clone();
        self.submit(&text)
    }

    /// Record the outcome of a dispatched question and return to idle
    pub fn resolve(&mut self, pending: PendingQuestion, outcome: Outcome) -> Resolution {
        self.busy = false;

        if pending.generation != self.generation {
            debug!(
                asked_in = pending.generation,
                current = self.generation,
                "Discarding reply from a reset conversation"
            );
            return Resolution::Discarded;
        }

        self.turns.push(Turn::assistant(outcome.into_text()));
        Resolution::Appended
    }

    /// Drop every turn except a fresh greeting.
    ///
    /// An in-flight question keeps the session busy; its reply is discarded
    /// when it arrives.
    pub fn reset(&mut self) {
        self.turns = vec![Turn::assistant(SEED_GREETING)];
        self.generation = self.generation.wrapping_add(1);
        debug!(generation = self.generation, "Conversation reset");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Author;

    fn texts(session: &Session) -> Vec<&str> {
        session.turns().iter().map(|t| t.text()).collect()
    }

    #[test]
    fn test_new_session_is_seeded() {
        let session = Session::new();
        assert_eq!(texts(&session), vec![SEED_GREETING]);
        assert_eq!(session.turns()[0].author(), Author::Assistant);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.draft_input().is_empty());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut session = Session::new();
        for blank in ["", "   ", "\n\t "] {
            assert!(session.submit(blank).is_none());
        }
        assert_eq!(session.turns().len(), 1);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_submit_appends_user_turn_and_goes_busy() {
        let mut session = Session::new();
        session.set_draft_input("Who is Andy?");

        let pending = session.submit_draft().unwrap();
        assert_eq!(pending.question(), "Who is Andy?");
        assert_eq!(session.state(), SessionState::AwaitingResponse);
        assert!(session.draft_input().is_empty());

        let last = session.last_turn().unwrap();
        assert_eq!(last.author(), Author::User);
        assert_eq!(last.text(), "Who is Andy?");
    }

    #[test]
    fn test_submit_keeps_text_as_given() {
        let mut session = Session::new();
        let pending = session.submit("  padded  ").unwrap();
        assert_eq!(pending.question(), "  padded  ");
        assert_eq!(session.last_turn().unwrap().text(), "  padded  ");
    }

    #[test]
    fn test_submit_while_busy_is_ignored() {
        let mut session = Session::new();
        session.submit("first").unwrap();
        session.set_draft_input("second");

        assert!(session.submit("second").is_none());
        assert!(session.submit_draft().is_none());
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.draft_input(), "second");
    }

    #[test]
    fn test_answered_outcome_appends_response_verbatim() {
        let mut session = Session::new();
        let pending = session.submit("Who is Andy?").unwrap();

        let resolution = session.resolve(
            pending,
            Outcome::Answered("Andy is a developer.".to_string()),
        );

        assert_eq!(resolution, Resolution::Appended);
        assert_eq!(
            texts(&session),
            vec![SEED_GREETING, "Who is Andy?", "Andy is a developer."]
        );
        assert_eq!(session.turns()[2].author(), Author::Assistant);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_rejected_outcome_is_prefixed() {
        let mut session = Session::new();
        let pending = session.submit("X").unwrap();
        session.resolve(pending, Outcome::Rejected("not found".to_string()));

        assert_eq!(session.last_turn().unwrap().text(), "Error: not found");
        assert!(!session.is_busy());
    }

    #[test]
    fn test_unreachable_outcome_embeds_detail() {
        let mut session = Session::new();
        let pending = session.submit("X").unwrap();
        session.resolve(pending, Outcome::Unreachable("timeout".to_string()));

        let last = session.last_turn().unwrap();
        assert!(last.text().contains("timeout"));
        assert!(last.text().starts_with("Network error"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_session_usable_after_failure() {
        let mut session = Session::new();
        let pending = session.submit("X").unwrap();
        session.resolve(pending, Outcome::Unreachable("refused".to_string()));

        let pending = session.submit("again").unwrap();
        session.resolve(pending, Outcome::Answered("ok".to_string()));
        assert_eq!(session.turns().len(), 5);
        assert_eq!(session.last_turn().unwrap().text(), "ok");
    }

    #[test]
    fn test_reset_yields_single_seed_turn() {
        let mut session = Session::new();
        let pending = session.submit("hello").unwrap();
        session.resolve(pending, Outcome::Answered("hi".to_string()));

        session.reset();
        assert_eq!(texts(&session), vec![SEED_GREETING]);

        session.reset();
        assert_eq!(texts(&session), vec![SEED_GREETING]);
    }

    #[test]
    fn test_reply_after_reset_is_discarded() {
        let mut session = Session::new();
        let pending = session.submit("slow question").unwrap();

        session.reset();
        assert!(session.is_busy());
        assert!(session.submit("too early").is_none());

        let resolution = session.resolve(pending, Outcome::Answered("late".to_string()));
        assert_eq!(resolution, Resolution::Discarded);
        assert_eq!(texts(&session), vec![SEED_GREETING]);
        assert!(!session.is_busy());

        assert!(session.submit("next").is_some());
    }
}
