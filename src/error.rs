use thiserror::Error;

/// Message shown when a generation failure carries no text of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Đã có lỗi xảy ra khi tạo ảnh. Vui lòng thử lại.";

/// Substrings that mark a backend failure as credential-related.
const AUTH_MARKERS: [&str; 2] = ["403", "API key"];

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Classified outcome of a failed generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("credential capability is not available in this environment")]
    CapabilityUnavailable,
    #[error("{0}")]
    AuthClass(String),
    #[error("No image data found in response.")]
    NoImageReturned,
    #[error("{0}")]
    Transport(String),
}

impl GenerationError {
    /// Sorts a raw failure message into auth-class or transport.
    ///
    /// This is a plain substring match: any message mentioning `403` or
    /// `API key` is treated as an authorization failure.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if AUTH_MARKERS.iter().any(|marker| message.contains(marker)) {
            GenerationError::AuthClass(message)
        } else {
            GenerationError::Transport(message)
        }
    }

    /// Re-runs the message heuristic on unclassified transport failures.
    pub fn reclassified(self) -> Self {
        match self {
            GenerationError::Transport(message) => GenerationError::classify(message),
            other => other,
        }
    }

    pub fn is_auth_class(&self) -> bool {
        matches!(self, GenerationError::AuthClass(_))
    }

    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            DEFAULT_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::classify(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("AI Studio environment not detected.")]
    CapabilityUnavailable,
    #[error("Failed to select key: {0}")]
    Dialog(String),
}

pub type Result<T> = std::result::Result<T, CardError>;
