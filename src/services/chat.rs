// src/services/chat.rs
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::errors::SubmitRejected;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisState, ChatMessage};
use crate::services::submission::AnalysisSubmission;
use crate::services::transport::Transport;

/// Conversation with the beauty assistant. The transcript lives only as long as the
/// session; the backend sees one message per call.
pub struct ChatSession {
    submission: AnalysisSubmission,
    history: RefCell<Vec<ChatMessage>>,
}

impl ChatSession {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            submission: AnalysisSubmission::new(transport),
            history: RefCell::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.borrow().clone()
    }

    pub fn state(&self) -> AnalysisState {
        self.submission.state()
    }

    pub fn is_waiting(&self) -> bool {
        self.submission.is_submitting()
    }

    /// Appends the trimmed message and sends it. A reply is appended as soon as it
    /// arrives and the session goes straight back to `Idle`.
    pub async fn send(&self, input: &str) -> Result<AnalysisState, SubmitRejected> {
        let message = input.trim();
        if message.is_empty() {
            return Err(SubmitRejected::EmptyMessage);
        }
        if self.submission.is_submitting() {
            return Err(SubmitRejected::AlreadySubmitting);
        }

        let history = {
            let mut history = self.history.borrow_mut();
            history.push(ChatMessage::user(message));
            history.clone()
        };

        let state = self
            .submission
            .submit(AnalysisRequest::ChatTurn {
                message: message.to_string(),
                history,
            })
            .await?;
        self.settle(state)
    }

    /// Re-sends the failed turn; its user entry is already in the transcript.
    pub async fn retry(&self) -> Result<AnalysisState, SubmitRejected> {
        let state = self.submission.retry().await?;
        self.settle(state)
    }

    fn settle(&self, state: AnalysisState) -> Result<AnalysisState, SubmitRejected> {
        match state {
            AnalysisState::Succeeded(AnalysisResult::Chat(reply)) => {
                self.history
                    .borrow_mut()
                    .push(ChatMessage::assistant(reply.reply));
                self.submission.reset()?;
                debug!("chat transcript at {} entries", self.history.borrow().len());
                Ok(AnalysisState::Idle)
            }
            other => Ok(other),
        }
    }
}
