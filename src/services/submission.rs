// src/services/submission.rs
use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, warn};

use crate::errors::{SubmissionError, SubmitRejected};
use crate::models::{AnalysisRequest, AnalysisState};
use crate::services::transport::{ApiRequest, Transport, parse_analysis};

/// One control's round-trips to an AI endpoint.
///
/// At most one request is in flight per instance; a `submit` or `retry` arriving while
/// one is outstanding is refused without touching the transport, so responses always
/// land in the order they were issued.
pub struct AnalysisSubmission {
    transport: Rc<dyn Transport>,
    state: RefCell<AnalysisState>,
    last_request: RefCell<Option<AnalysisRequest>>,
}

impl AnalysisSubmission {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            transport,
            state: RefCell::new(AnalysisState::Idle),
            last_request: RefCell::new(None),
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.borrow().is_submitting()
    }

    pub fn last_request(&self) -> Option<AnalysisRequest> {
        self.last_request.borrow().clone()
    }

    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisState, SubmitRejected> {
        if self.is_submitting() {
            warn!("Ignoring {:?} submission: request in flight", request.kind());
            return Err(SubmitRejected::AlreadySubmitting);
        }

        *self.last_request.borrow_mut() = Some(request.clone());
        Ok(self.run(request).await)
    }

    /// Re-sends the exact request that failed.
    pub async fn retry(&self) -> Result<AnalysisState, SubmitRejected> {
        match &*self.state.borrow() {
            AnalysisState::Failed(_) => {}
            AnalysisState::Submitting => return Err(SubmitRejected::AlreadySubmitting),
            AnalysisState::Idle | AnalysisState::Succeeded(_) => {
                return Err(SubmitRejected::NothingToRetry);
            }
        }

        let request = self
            .last_request
            .borrow()
            .clone()
            .ok_or(SubmitRejected::NothingToRetry)?;
        Ok(self.run(request).await)
    }

    /// Back to `Idle`, forgetting the last request and its outcome. An in-flight request
    /// cannot be abandoned.
    pub fn reset(&self) -> Result<(), SubmitRejected> {
        if self.is_submitting() {
            return Err(SubmitRejected::AlreadySubmitting);
        }
        *self.state.borrow_mut() = AnalysisState::Idle;
        *self.last_request.borrow_mut() = None;
        Ok(())
    }

    async fn run(&self, request: AnalysisRequest) -> AnalysisState {
        let kind = request.kind();
        *self.state.borrow_mut() = AnalysisState::Submitting;
        debug!("{:?} submitting", kind);

        let outcome = match self.transport.send(ApiRequest::for_analysis(&request)).await {
            Ok(response) => parse_analysis(kind, &response),
            Err(e) => Err(e),
        };

        let next = match outcome {
            Ok(result) => {
                debug!("{:?} succeeded", kind);
                AnalysisState::Succeeded(result)
            }
            Err(e) => {
                match &e {
                    SubmissionError::ServerRejected { status, message } => {
                        warn!("{:?} rejected ({}): {}", kind, status, message)
                    }
                    SubmissionError::ConnectivityFailure { cause } => {
                        error!("{:?} failed: {}", kind, cause)
                    }
                }
                AnalysisState::Failed(e)
            }
        };

        *self.state.borrow_mut() = next.clone();
        next
    }
}
