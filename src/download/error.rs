use std::fmt;

/// Transport-level failure during a page, API or media fetch.
///
/// Timeouts are kept apart from other transport failures so the user can be
/// told to simply try again.
#[derive(Debug)]
pub enum NetworkError {
    /// Request (or body stream) exceeded its timeout
    Timeout(String),
    /// Connection, TLS, body decoding or other transport failure
    Transport(String),
    /// Media server answered with a non-success status
    HttpStatus(reqwest::StatusCode),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Timeout(msg) => write!(f, "timed out: {}", msg),
            NetworkError::Transport(msg) => write!(f, "{}", msg),
            NetworkError::HttpStatus(status) => write!(f, "HTTP {}", status),
        }
    }
}

impl std::error::Error for NetworkError {}

impl NetworkError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            NetworkError::Timeout(_) => "timeout",
            NetworkError::Transport(_) => "transport",
            NetworkError::HttpStatus(_) => "http_status",
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::HttpStatus(status)
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

/// The post exists as a link but yields no downloadable media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Post deleted or never existed
    NotFound,
    /// Post belongs to a private account (login required)
    PrivateAccount,
    /// Post was fetched but nothing classifiable as photo/video was in it
    NoMediaFound,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::NotFound => write!(f, "post not found"),
            ResolutionError::PrivateAccount => write!(f, "private account or login required"),
            ResolutionError::NoMediaFound => write!(f, "no media found"),
        }
    }
}

impl std::error::Error for ResolutionError {}

impl ResolutionError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            ResolutionError::NotFound => "not_found",
            ResolutionError::PrivateAccount => "private_account",
            ResolutionError::NoMediaFound => "no_media_found",
        }
    }
}
