//! Post identifier (shortcode) extraction from validated links.

use crate::core::error::{AppError, AppResult};
use crate::core::validation::{validate_link, LinkKind};

/// Route markers in lookup order. A link that contains several markers is
/// resolved by the first marker in this list, not by position in the path.
const ROUTE_PRIORITY: &[&str] = &["reel", "tv", "p"];

/// Extracts the post shortcode from an already validated link.
///
/// The identifier is the path segment following the first route marker found
/// (`reel`, then `tv`, then `p`), with any query string or fragment cut off.
///
/// # Errors
/// `AppError::Extraction` when no marker is present or nothing follows it.
///
/// # Examples
/// ```
/// use igrelay::download::shortcode::extract_shortcode;
///
/// assert_eq!(extract_shortcode("https://www.instagram.com/p/ABC123/?igsh=x").unwrap(), "ABC123");
/// assert!(extract_shortcode("https://www.instagram.com/reel/").is_err());
/// ```
pub fn extract_shortcode(url: &str) -> AppResult<String> {
    let url = url.trim();
    let parts: Vec<&str> = url.split('/').collect();

    let marker_index = ROUTE_PRIORITY
        .iter()
        .find_map(|marker| parts.iter().position(|part| part == marker))
        .ok_or_else(|| AppError::Extraction(format!("no post marker in {}", url)))?;

    let identifier = parts
        .get(marker_index + 1)
        .and_then(|segment| segment.split(['?', '#']).next())
        .unwrap_or_default();

    if identifier.is_empty() {
        return Err(AppError::Extraction(format!(
            "nothing follows /{}/ in {}",
            parts[marker_index], url
        )));
    }

    Ok(identifier.to_string())
}

/// A validated post link together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTarget {
    /// Link as sent by the user (trimmed)
    pub url: String,
    pub shortcode: String,
    pub kind: LinkKind,
}

impl PostTarget {
    /// Validate `text` and extract its shortcode.
    pub fn parse(text: &str) -> AppResult<Self> {
        let kind = validate_link(text)?;
        let url = text.trim().to_string();
        let shortcode = extract_shortcode(&url)?;
        Ok(Self { url, shortcode, kind })
    }

    /// Canonical page URL under `base` (e.g. `https://www.instagram.com`).
    pub fn page_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}/",
            base.trim_end_matches('/'),
            self.kind.route_marker(),
            self.shortcode
        )
    }
}
