use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::models::{AspectRatio, GenerationKind};

/// Where a failed submit/poll call broke down, classified from the HTTP status
/// (or lack of one) at the point the error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Network,
    InvalidRequest,
    AccessDenied,
    NotFound,
    RateLimited,
    Server,
    Remote,
    Decode,
}

impl TransportErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => TransportErrorKind::InvalidRequest,
            401 | 403 => TransportErrorKind::AccessDenied,
            404 => TransportErrorKind::NotFound,
            429 => TransportErrorKind::RateLimited,
            500..=599 => TransportErrorKind::Server,
            _ => TransportErrorKind::Remote,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Network => "network",
            TransportErrorKind::InvalidRequest => "invalid_request",
            TransportErrorKind::AccessDenied => "access_denied",
            TransportErrorKind::NotFound => "not_found",
            TransportErrorKind::RateLimited => "rate_limited",
            TransportErrorKind::Server => "server",
            TransportErrorKind::Remote => "remote",
            TransportErrorKind::Decode => "decode",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Empty result: {}", .finish_reason.as_deref().unwrap_or("EMPTY_BUFFER"))]
    EmptyResult { finish_reason: Option<String> },

    #[error("Void result: operation completed without a video location")]
    VoidResult,

    #[error("Fetch failed: {status}")]
    FetchFailed { status: u16 },

    #[error("Transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        status: Option<u16>,
        message: String,
    },

    #[error("Operation failed: {message}")]
    OperationFailed { code: Option<i64>, message: String },

    #[error("Polling timed out after {attempts} attempts ({:.1}s)", .elapsed.as_secs_f64())]
    PollTimeout { attempts: u32, elapsed: Duration },

    #[error("Job cancelled")]
    Cancelled,

    #[error("Access required: no eligible credential is selected")]
    AccessRequired,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Aspect ratio {ratio} is not supported for {kind} generation")]
    UnsupportedAspectRatio {
        kind: GenerationKind,
        ratio: AspectRatio,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    pub fn transport(kind: TransportErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        GenError::Transport {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Builds a transport error from a non-success status and the response body.
    /// Google-style `{"error": {"message": ..}}` bodies are unwrapped; anything
    /// else is kept as the raw text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value["error"]["message"]
                    .as_str()
                    .map(String::from)
            })
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        GenError::Transport {
            kind: TransportErrorKind::from_status(status),
            status: Some(status),
            message,
        }
    }

    /// Original upstream text, kept so callers can inspect it.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            GenError::Transport { message, .. } => Some(message),
            GenError::OperationFailed { message, .. } => Some(message),
            GenError::EmptyResult { finish_reason } => finish_reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_safety_block(&self) -> bool {
        match self {
            GenError::EmptyResult {
                finish_reason: Some(reason),
            } => is_safety_reason(reason),
            GenError::OperationFailed { message, .. } => is_safety_reason(message),
            _ => false,
        }
    }

    /// Presentation hint for a UI layer.
    pub fn advice(&self) -> UserAdvice {
        if self.is_safety_block() {
            return UserAdvice::RevisePrompt;
        }

        match self {
            GenError::AccessRequired => UserAdvice::Reauthenticate,
            GenError::Transport { kind, message, .. } => match kind {
                TransportErrorKind::AccessDenied | TransportErrorKind::NotFound => {
                    UserAdvice::Reauthenticate
                }
                TransportErrorKind::InvalidRequest => UserAdvice::ResetParameters,
                TransportErrorKind::Remote if is_safety_reason(message) => UserAdvice::RevisePrompt,
                _ => UserAdvice::Show(self.to_string()),
            },
            GenError::FetchFailed { status: 401 | 403 } => UserAdvice::Reauthenticate,
            _ => UserAdvice::Show(self.to_string()),
        }
    }
}

fn is_safety_reason(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    ["SAFETY", "PROHIBITED", "BLOCKLIST", "SPII"]
        .iter()
        .any(|marker| upper.contains(marker))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAdvice {
    Reauthenticate,
    RevisePrompt,
    ResetParameters,
    Show(String),
}

impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        GenError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
