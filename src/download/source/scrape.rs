//! ScrapingResolver: reads the public post page and pattern-matches the first
//! embedded media URL.
//!
//! Only one item is ever produced. Carousels need the structured resolver.

use crate::core::config::PipelineConfig;
use crate::core::error::{AppError, AppResult};
use crate::download::error::ResolutionError;
use crate::download::media::MediaReference;
use crate::download::shortcode::PostTarget;
use crate::download::source::{http_client, MediaResolver};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;

static VIDEO_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""video_url"\s*:\s*"([^"]+)""#).expect("Failed to compile video url regex"));

static DISPLAY_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""display_url"\s*:\s*"([^"]+)""#).expect("Failed to compile display url regex"));

pub struct ScrapingResolver {
    client: reqwest::Client,
    base_url: String,
}

impl ScrapingResolver {
    pub fn new(config: &PipelineConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(&config.user_agent, config.page_timeout)?,
            base_url: config.instagram_base_url.clone(),
        })
    }
}

/// Finds the first media URL in a post page. A video URL wins over a
/// display (photo) URL.
pub fn find_media_in_page(page: &str) -> Option<MediaReference> {
    if let Some(captures) = VIDEO_URL_RE.captures(page) {
        if let Some(reference) = MediaReference::video(unescape_json_url(&captures[1])) {
            return Some(reference);
        }
    }
    DISPLAY_URL_RE
        .captures(page)
        .and_then(|captures| MediaReference::photo(unescape_json_url(&captures[1])))
}

/// URLs embedded in page JSON escape slashes and ampersands.
fn unescape_json_url(raw: &str) -> String {
    raw.replace("\\/", "/").replace("\\u0026", "&")
}

#[async_trait]
impl MediaResolver for ScrapingResolver {
    fn name(&self) -> &str {
        "scraping"
    }

    async fn resolve(&self, target: &PostTarget) -> AppResult<Vec<MediaReference>> {
        let page_url = target.page_url(&self.base_url);
        log::info!("ScrapingResolver: fetching {}", page_url);

        let response = self.client.get(&page_url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound.into());
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!("post page answered HTTP {}", status)));
        }

        let page = response.text().await?;
        match find_media_in_page(&page) {
            Some(reference) => {
                log::info!(
                    "ScrapingResolver: found {} for shortcode={}",
                    reference.kind().as_str(),
                    target.shortcode
                );
                Ok(vec![reference])
            }
            None => {
                log::warn!(
                    "ScrapingResolver: no media pattern in {} bytes of page for shortcode={}",
                    page.len(),
                    target.shortcode
                );
                Err(ResolutionError::NoMediaFound.into())
            }
        }
    }
}
