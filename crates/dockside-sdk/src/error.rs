/// Classification of [`Error`], compared by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any request was sent
    InvalidParameter,
    /// Engine answered 404
    NotFound,
    /// Engine answered 5xx
    System,
    /// Engine answered any other non-2xx status
    Other,
    /// Success response with a body that could not be decoded
    Decode,
    /// Request never produced a response
    Transport,
}

/// Error returned by every client operation
///
/// Engine errors display their message unmodified, [`Error::kind`] tells them apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    System { status: u16, message: String },
    #[error("{message}")]
    Other { status: u16, message: String },
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::System { .. } => ErrorKind::System,
            Error::Other { .. } => ErrorKind::Other,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Transport(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status the engine answered with, if the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::System { status, .. } | Error::Other { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        self.kind() == ErrorKind::InvalidParameter
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_system(&self) -> bool {
        self.kind() == ErrorKind::System
    }
}

/// Failure of the transport itself, passed to the caller unchanged
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request to engine failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid engine URL: {0}")]
    InvalidUrl(String),
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
