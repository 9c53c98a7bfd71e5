use crate::error::AppError;
use serde::Serialize;

/// Failure reported by the remote speech endpoint or the transport underneath it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<u16>, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(Some(status), None, message)
    }

    /// Connection, proxy or timeout failure with no upstream response
    pub fn network(message: impl std::fmt::Display) -> Self {
        Self::new(None, None, format!("network error: {}", message))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RateLimited,
    ServerOverload,
    NetworkTransient,
    Fatal,
}

const NETWORK_MARKERS: &[&str] = &[
    "network",
    "fetch",
    "rpc failed",
    "proxy",
    "timeout",
    "timed out",
    "connection",
];

impl ErrorCategory {
    /// Closed classification of a transport error.
    ///
    /// Structured fields win; message substrings are consulted only when the
    /// status and code say nothing.
    pub fn classify(err: &TransportError) -> Self {
        match err.status {
            Some(429) => return ErrorCategory::RateLimited,
            Some(500) | Some(503) => return ErrorCategory::ServerOverload,
            _ => {}
        }

        match err.code.as_deref() {
            Some("RESOURCE_EXHAUSTED") => return ErrorCategory::RateLimited,
            Some("INTERNAL") | Some("UNKNOWN") | Some("UNAVAILABLE") => {
                return ErrorCategory::ServerOverload
            }
            _ => {}
        }

        let message = err.message.to_lowercase();
        if message.contains("quota")
            || message.contains("429")
            || message.contains("resource_exhausted")
        {
            ErrorCategory::RateLimited
        } else if NETWORK_MARKERS.iter().any(|marker| message.contains(marker)) {
            ErrorCategory::NetworkTransient
        } else {
            ErrorCategory::Fatal
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorCategory::Fatal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::RateLimited => "rate_limited",
            ErrorCategory::ServerOverload => "server_overload",
            ErrorCategory::NetworkTransient => "network_transient",
            ErrorCategory::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TtsServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("input too large: {0}")]
    TooLarge(String),
    #[error("no audio generated: {0}")]
    NoAudio(String),
    #[error("speech endpoint rejected the request: {0}")]
    UpstreamFatal(TransportError),
    #[error("speech endpoint still failing after {attempts} attempts ({category}): {source}")]
    RetriesExhausted {
        attempts: u32,
        category: ErrorCategory,
        source: TransportError,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TtsServiceError {
    /// The transport failure that ended the operation, if any
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            TtsServiceError::UpstreamFatal(source) => Some(source),
            TtsServiceError::RetriesExhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<TtsServiceError> for AppError {
    fn from(err: TtsServiceError) -> Self {
        match err {
            TtsServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TtsServiceError::TooLarge(msg) => AppError::PayloadTooLarge(msg),
            TtsServiceError::NoAudio(msg) => {
                AppError::ExternalService(format!("No audio generated: {}", msg))
            }
            TtsServiceError::RetriesExhausted {
                category: ErrorCategory::RateLimited,
                source,
                ..
            } => AppError::RateLimitExceeded(source.message),
            err @ TtsServiceError::RetriesExhausted { .. } => {
                AppError::ExternalService(err.to_string())
            }
            err @ TtsServiceError::UpstreamFatal(_) => AppError::ExternalService(err.to_string()),
            TtsServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
