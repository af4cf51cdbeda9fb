use crate::download::error::{NetworkError, ResolutionError};
use thiserror::Error;

/// Centralized error types for the application
///
/// Every pipeline stage returns `AppResult<T>`; the batch controller turns
/// whatever reaches it into exactly one user-facing status text via
/// [`AppError::user_message`].
///
/// # Example
///
/// ```
/// use igrelay::core::error::AppError;
///
/// let err = AppError::InvalidLink("hello".to_string());
/// assert_eq!(err.category(), "invalid_link");
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Incoming text is not a supported post link
    #[error("Unsupported link: {0}")]
    InvalidLink(String),

    /// The link matched but no post identifier could be read from it
    #[error("Could not extract identifier: {0}")]
    Extraction(String),

    /// The post could not be turned into media references
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Structured API failure (rate limit, expired query id, schema change)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Transport failure during any fetch
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Uploading one item to the chat failed
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Telegram API errors outside of media delivery (status messages)
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(NetworkError::from(err))
    }
}

impl AppError {
    /// Stable label for logs
    pub fn category(&self) -> &'static str {
        match self {
            AppError::InvalidLink(_) => "invalid_link",
            AppError::Extraction(_) => "extraction",
            AppError::Resolution(e) => e.subcategory(),
            AppError::Upstream(_) => "upstream",
            AppError::Network(e) => e.subcategory(),
            AppError::Delivery(_) => "delivery",
            AppError::Telegram(_) => "telegram",
            AppError::Io(_) => "io",
        }
    }

    /// Timeouts are worth retrying by hand; everything else usually is not.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Network(NetworkError::Timeout(_)))
    }

    /// The single status text shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidLink(_) => "🔗 Send a valid Instagram link to a post, reel or IGTV video.".to_string(),
            AppError::Extraction(_) => "❌ Could not extract the post identifier from the link.".to_string(),
            AppError::Resolution(ResolutionError::NotFound) => {
                "❌ Post not found. It may have been deleted.".to_string()
            }
            AppError::Resolution(ResolutionError::PrivateAccount) => {
                "🔒 This account is private. Only public posts can be downloaded.".to_string()
            }
            AppError::Resolution(ResolutionError::NoMediaFound) => "❌ No media found in this post.".to_string(),
            AppError::Upstream(detail) => format!("❌ Instagram error: {}", detail),
            AppError::Network(NetworkError::Timeout(_)) => {
                "⌛ Instagram took too long to respond. Please try again later.".to_string()
            }
            AppError::Network(NetworkError::HttpStatus(code)) => {
                format!("⚠️ The media server answered with HTTP {}.", code)
            }
            AppError::Network(NetworkError::Transport(detail)) => format!("⚠️ Network error: {}", detail),
            AppError::Delivery(detail) => format!("⚠️ Failed to send media to Telegram: {}", detail),
            AppError::Telegram(e) => format!("⚠️ Telegram error: {}", e),
            AppError::Io(e) => format!("⚠️ Unexpected error: {}", e),
        }
    }
}
