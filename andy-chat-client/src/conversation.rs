//! Drivers that connect a [`Session`] to an [`AnswerService`]

use andy_chat_core::session::{Outcome, PendingQuestion, Resolution, Session};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::base::{dispatch, AnswerService};

/// A session plus the service that answers it, driven one question at a time
pub struct Conversation {
    session: Session,
    service: Arc<dyn AnswerService>,
}

impl Conversation {
    pub fn new(service: Arc<dyn AnswerService>) -> Self {
        Self {
            session: Session::new(),
            service,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submit, wait for the reply, and record it.
    ///
    /// Returns `None` when the session ignored the submission.
    pub async fn submit(&mut self, text: &str) -> Option<Resolution> {
        let pending = self.session.submit(text)?;
        let outcome = dispatch(self.service.as_ref(), &pending).await;
        Some(self.session.resolve(pending, outcome))
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}

/// Background worker that runs dispatched questions off the UI loop.
///
/// The UI keeps sole ownership of the session: it hands tickets to
/// [`Dispatcher::send`] and later feeds each `(ticket, outcome)` pair from
/// [`Dispatcher::try_recv`] back into [`Session::resolve`].
pub struct Dispatcher {
    request_tx: mpsc::UnboundedSender<PendingQuestion>,
    reply_rx: mpsc::UnboundedReceiver<(PendingQuestion, Outcome)>,
}

impl Dispatcher {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(service: Arc<dyn AnswerService>) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<PendingQuestion>();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(pending) = request_rx.recv().await {
                let service = Arc::clone(&service);
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let outcome = dispatch(service.as_ref(), &pending).await;
                    let _ = reply_tx.send((pending, outcome));
                });
            }
            info!("Dispatcher stopped");
        });

        Self {
            request_tx,
            reply_rx,
        }
    }

    /// Queue one accepted question. Hands the ticket back if the worker is gone.
    pub fn send(&self, pending: PendingQuestion) -> Result<(), PendingQuestion> {
        self.request_tx.send(pending).map_err(|e| e.0)
    }

    /// Next finished question, if any, without waiting
    pub fn try_recv(&mut self) -> Option<(PendingQuestion, Outcome)> {
        self.reply_rx.try_recv().ok()
    }

    /// Wait for the next finished question
    pub async fn recv(&mut self) -> Option<(PendingQuestion, Outcome)> {
        self.reply_rx.recv().await
    }
}
