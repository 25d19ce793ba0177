//! Unified error types for the AAA accounting service.
//!
//! Every lifecycle failure is surfaced as one of a small set of categories
//! rather than a raw backend cause:
//! - INVALID_ARGUMENT: malformed or missing request data
//! - FAILED_PRECONDITION: the referenced session is not in the table
//! - ALREADY_EXISTS: the subscriber already has a live session
//! - INTERNAL: a backend operation this core depends on failed
//! - UNAVAILABLE: a backend peer could not be reached

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArgument,
    FailedPrecondition,
    AlreadyExists,
    Internal,
    Unavailable,
}

impl ErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::FailedPrecondition => 412,
            Self::AlreadyExists => 409,
            Self::Internal => 500,
            Self::Unavailable => 503,
        }
    }
}

/// Unified error type for the accounting service.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Bulk insert left some subscribers out; the rest were committed.
    #[error("unable to add the session for the following IMSIs: {0:?}")]
    SessionsNotAdded(Vec<String>),

    /// Two independent backend operations failed in one transition.
    #[error("{context}; backend: {backend}, radius: {radius}")]
    Combined {
        context: String,
        backend: Box<Error>,
        radius: Box<Error>,
    },
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        Self::FailedPrecondition(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Combine a backend teardown failure and a RADIUS failure into one error.
    pub fn combined(context: impl Into<String>, backend: Error, radius: Error) -> Self {
        Self::Combined {
            context: context.into(),
            backend: Box::new(backend),
            radius: Box::new(radius),
        }
    }

    /// Get the failure category.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::FailedPrecondition(_) => ErrorCode::FailedPrecondition,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::Internal(_) => ErrorCode::Internal,
            Self::Unavailable(_) => ErrorCode::Unavailable,
            Self::SessionsNotAdded(_) => ErrorCode::Internal,
            Self::Combined { .. } => ErrorCode::Internal,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }

    /// Re-categorize an error as UNAVAILABLE, keeping its message.
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::Unavailable(_) => self,
            other => Self::Unavailable(other.to_string()),
        }
    }

    /// Re-categorize an error as INTERNAL, keeping its message.
    pub fn into_internal(self) -> Self {
        match self {
            Self::Internal(_) => self,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
