//! Link validation for incoming messages
//!
//! The whole message text is treated as one URL. Only Instagram post, reel
//! and IGTV links are accepted; anything else is rejected before any network
//! work happens.

use crate::core::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Supported post link, compiled once at startup
static INSTAGRAM_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?instagram\.com/(p|reel|tv)/").expect("Failed to compile Instagram link regex")
});

/// The kind of post a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `/p/<code>`: photo, video or carousel
    Post,
    /// `/reel/<code>`
    Reel,
    /// `/tv/<code>`: long-form video
    Tv,
}

impl LinkKind {
    /// Route marker as it appears in the URL path
    pub fn route_marker(&self) -> &'static str {
        match self {
            LinkKind::Post => "p",
            LinkKind::Reel => "reel",
            LinkKind::Tv => "tv",
        }
    }
}

/// Checks that `text` is a supported Instagram link and tells which kind.
///
/// Surrounding whitespace is ignored. No side effects.
///
/// # Examples
/// ```
/// use igrelay::core::validation::{validate_link, LinkKind};
///
/// assert_eq!(validate_link("https://www.instagram.com/reel/ABC/").unwrap(), LinkKind::Reel);
/// assert!(validate_link("https://example.com/p/ABC/").is_err());
/// ```
pub fn validate_link(text: &str) -> AppResult<LinkKind> {
    let text = text.trim();
    let caps = INSTAGRAM_LINK_REGEX
        .captures(text)
        .ok_or_else(|| AppError::InvalidLink(text.chars().take(200).collect()))?;

    match caps.get(1).map(|m| m.as_str()) {
        Some("reel") => Ok(LinkKind::Reel),
        Some("tv") => Ok(LinkKind::Tv),
        _ => Ok(LinkKind::Post),
    }
}
