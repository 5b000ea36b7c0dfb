// src/errors.rs
use thiserror::Error;

/// Why a selected file was refused before it could be staged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File size too large. Please choose a file under 10MB.")]
    TooLarge { size_bytes: u64, limit: u64 },

    #[error("Please upload a valid image file.")]
    WrongType { mime_type: String },

    #[error("Could not read the selected file: {0}")]
    Unreadable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    #[error("Failed to connect to the service. Please try again.")]
    ConnectivityFailure { cause: String },
}

impl SubmissionError {
    pub fn connectivity(cause: impl Into<String>) -> Self {
        SubmissionError::ConnectivityFailure {
            cause: cause.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionError::ServerRejected { status, .. } => Some(*status),
            SubmissionError::ConnectivityFailure { .. } => None,
        }
    }
}

/// A `submit`/`retry` call that was ignored without touching the network.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("A request is already in flight")]
    AlreadySubmitting,

    #[error("There is no failed request to retry")]
    NothingToRetry,

    #[error("Message is empty")]
    EmptyMessage,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Please sign in to continue")]
    LoginRequired,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to connect to the account service. Please try again.")]
    Connectivity,

    #[error("Token storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rejected(#[from] SubmitRejected),

    #[error(transparent)]
    Account(#[from] AccountError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}
