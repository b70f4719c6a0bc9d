use thiserror::Error;

/// Client-level error type.
/// Expected outcomes (validation failures, empty states, stale responses) are
/// not errors; they live in the outcome enums of each controller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File rejected: {0}")]
    FileRejected(String),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

impl ClientError {
    /// Short machine-readable code, used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::FileRejected(_) => "FILE_REJECTED",
            ClientError::Http { .. } => "HTTP_ERROR",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Parse(_) => "PARSE_ERROR",
            ClientError::EmptyResponse => "EMPTY_RESPONSE",
            ClientError::Render(_) => "RENDER_ERROR",
            ClientError::Io(_) => "IO_ERROR",
        }
    }

    /// The message surfaced to the user. Network-class failures collapse into
    /// one generic line; validation messages are shown as-is.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) | ClientError::FileRejected(msg) => msg.clone(),
            ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
            _ => "Network error. Please try again.".to_string(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Http { .. } | ClientError::Transport(_) | ClientError::EmptyResponse
        )
    }
}
