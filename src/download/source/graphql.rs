//! StructuredResolver: enumerates post media through Instagram's GraphQL API.
//!
//! Features:
//! - Public posts/reels/IGTV without login
//! - Carousels (sidecars) expanded in published order
//! - `doc_id` configurable via `INSTAGRAM_DOC_ID` (rotates every few weeks)
//! - Private accounts, rate limiting and query expiry reported as distinct errors

use crate::core::config::PipelineConfig;
use crate::core::error::{AppError, AppResult};
use crate::download::error::ResolutionError;
use crate::download::media::MediaReference;
use crate::download::shortcode::PostTarget;
use crate::download::source::{http_client, truncate_for_log, MediaResolver};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// Instagram internal app ID (public, embedded in the web app).
const IG_APP_ID: &str = "936619743392459";

/// Facebook LSD token (anti-CSRF, public static value used by web scrapers).
const FB_LSD_TOKEN: &str = "AVqbxe3J_YA";

/// Facebook ASBD ID (public, embedded in the web app).
const FB_ASBD_ID: &str = "129477";

/// Resolver backed by the GraphQL shortcode query.
pub struct StructuredResolver {
    client: reqwest::Client,
    endpoint: String,
    doc_id: String,
    origin: String,
}

impl StructuredResolver {
    pub fn new(config: &PipelineConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(&config.user_agent, config.api_timeout)?,
            endpoint: config.graphql_endpoint.clone(),
            doc_id: config.doc_id.clone(),
            origin: config.instagram_base_url.clone(),
        })
    }

    /// POST the shortcode query and return the decoded JSON body.
    async fn fetch_post(&self, shortcode: &str) -> AppResult<Value> {
        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-FB-LSD", FB_LSD_TOKEN)
            .header("X-ASBD-ID", FB_ASBD_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", format!("{}/", self.origin))
            .header("Origin", self.origin.as_str())
            .form(&[
                ("doc_id", self.doc_id.as_str()),
                ("variables", variables.as_str()),
                ("lsd", FB_LSD_TOKEN),
            ])
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(ResolutionError::NotFound.into()),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(AppError::Upstream("rate limited by Instagram".to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Upstream(format!("access denied (HTTP {})", status.as_u16())))
            }
            _ => return Err(AppError::Upstream(format!("GraphQL API answered HTTP {}", status))),
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "StructuredResolver: GraphQL returned non-JSON ({}): {}",
                e,
                truncate_for_log(&text)
            );
            AppError::Upstream("unexpected response format (login wall or schema change)".to_string())
        })
    }
}

/// Turn a GraphQL response body into media references.
///
/// Kept free of I/O so schema handling can be exercised directly.
pub fn parse_media_response(body: &Value) -> AppResult<Vec<MediaReference>> {
    // Detect doc_id expiry or error responses
    if let Some(message) = body.get("message").and_then(|v| v.as_str()) {
        if message.contains("login_required") || message.contains("checkpoint_required") {
            return Err(ResolutionError::PrivateAccount.into());
        }
        if message.contains("useragent mismatch") || message.contains("doc_id") {
            log::error!("StructuredResolver: possible doc_id expiry: {}", message);
            return Err(AppError::Upstream(format!("doc_id may be expired: {}", message)));
        }
        if body.get("data").is_none() {
            return Err(AppError::Upstream(message.to_string()));
        }
    }
    if body.get("require_login").and_then(|v| v.as_bool()).unwrap_or(false) {
        return Err(ResolutionError::PrivateAccount.into());
    }

    let media = body
        .pointer("/data/xdt_shortcode_media")
        .or_else(|| body.pointer("/data/shortcode_media"))
        .filter(|m| !m.is_null())
        .ok_or(ResolutionError::NotFound)?;

    let references: Vec<MediaReference> = match media
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(|v| v.as_array())
    {
        Some(edges) => edges
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| {
                let node = edge.get("node")?;
                let reference = classify_node(node);
                if reference.is_none() {
                    log::warn!("StructuredResolver: carousel item {} has no usable URL, skipping", i + 1);
                }
                reference
            })
            .collect(),
        None => classify_node(media).into_iter().collect(),
    };

    if references.is_empty() {
        return Err(ResolutionError::NoMediaFound.into());
    }
    Ok(references)
}

/// Photo or video, depending on the node's own `is_video` flag.
fn classify_node(node: &Value) -> Option<MediaReference> {
    let is_video = node.get("is_video").and_then(|v| v.as_bool()).unwrap_or(false);
    if is_video {
        node.get("video_url")
            .and_then(|v| v.as_str())
            .and_then(MediaReference::video)
    } else {
        node.get("display_url")
            .and_then(|v| v.as_str())
            .and_then(MediaReference::photo)
    }
}

#[async_trait]
impl MediaResolver for StructuredResolver {
    fn name(&self) -> &str {
        "structured"
    }

    async fn resolve(&self, target: &PostTarget) -> AppResult<Vec<MediaReference>> {
        log::info!("StructuredResolver: querying shortcode={}", target.shortcode);
        let body = self.fetch_post(&target.shortcode).await?;
        let references = parse_media_response(&body)?;
        log::info!(
            "StructuredResolver: {} item(s) for shortcode={}",
            references.len(),
            target.shortcode
        );
        Ok(references)
    }
}
