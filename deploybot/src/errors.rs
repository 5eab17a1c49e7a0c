use crate::db::errors::DbError;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// The commit message collaborator failed
    #[error("Failed to read latest commit message: {message}")]
    CommitMessage { message: String },

    /// HMAC computation failed
    #[error("Failed to sign webhook payload: {message}")]
    Signing { message: String },

    /// Network failure or non-success response from the webhook endpoint
    #[error("Webhook delivery failed: {message}")]
    Delivery { status_code: Option<u16>, message: String },

    /// Configuration is inconsistent or incomplete
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A deployment event could not be constructed from its raw parts
    #[error("Invalid deployment event: {message}")]
    InvalidEvent { message: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which stage of a notification a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// An entity or the commit message could not be resolved; nothing was sent
    Resolution,
    /// The signature could not be computed; nothing was sent
    Signing,
    /// The request was sent (or attempted) and failed
    Transport,
    /// Anything else, e.g. serialization
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Resolution => "resolution",
            FailureKind::Signing => "signing",
            FailureKind::Transport => "transport",
            FailureKind::Internal => "internal",
        }
    }
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::NotFound { .. } | Error::Database(_) | Error::CommitMessage { .. } => FailureKind::Resolution,
            Error::Signing { .. } => FailureKind::Signing,
            Error::Delivery { .. } => FailureKind::Transport,
            Error::InvalidConfig { .. } | Error::InvalidEvent { .. } | Error::Other(_) => FailureKind::Internal,
        }
    }

    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
