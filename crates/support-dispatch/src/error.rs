//! Error types for Support Dispatch

use thiserror::Error;

use crate::domain::aggregates::TicketError;
use crate::ports::outbound::RepositoryError;

/// Support Dispatch error type
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Malformed ticket or rule input, rejected before any mutation
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying storage failure; the ticket change and its audit record
    /// were rolled back together
    #[error("persistence error: {0}")]
    Persistence(RepositoryError),

    /// Malformed SLA configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Optimistic version check kept failing after all retries
    #[error("concurrent update conflict: {0}")]
    Conflict(String),
}

impl DispatchError {
    /// Message shown to the ticket-creation flow when immediate assignment fails.
    pub fn user_message(&self) -> &'static str {
        "could not assign ticket"
    }

    /// Short tag used in logs and tick reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
            Self::Configuration(_) => "configuration",
            Self::Conflict(_) => "conflict",
        }
    }
}

impl From<RepositoryError> for DispatchError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Persistence(other),
        }
    }
}

impl From<TicketError> for DispatchError {
    fn from(err: TicketError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type for Support Dispatch
pub type Result<T> = std::result::Result<T, DispatchError>;
