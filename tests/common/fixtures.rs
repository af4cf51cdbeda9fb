//! Mock Instagram endpoints and pipeline configs pointing at them

#![allow(dead_code)]

use async_trait::async_trait;
use igrelay::core::ResolverKind;
use igrelay::download::{MediaResolver, PostTarget};
use igrelay::{AppResult, MediaReference, PipelineConfig};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GRAPHQL_PATH: &str = "/api/graphql";

/// Pipeline config aimed at `server`, with short timeouts and `temp_root`
/// as the working directory parent.
pub fn test_config(server: &MockServer, temp_root: &Path, resolver: ResolverKind) -> PipelineConfig {
    PipelineConfig {
        resolver,
        page_timeout: Duration::from_secs(5),
        api_timeout: Duration::from_secs(5),
        media_timeout: Duration::from_secs(2),
        temp_root: temp_root.to_path_buf(),
        instagram_base_url: server.uri(),
        graphql_endpoint: format!("{}{}", server.uri(), GRAPHQL_PATH),
        ..PipelineConfig::default()
    }
}

/// Media node in GraphQL shape
pub fn photo_node(url: &str) -> Value {
    json!({ "__typename": "XDTGraphImage", "is_video": false, "display_url": url })
}

pub fn video_node(url: &str) -> Value {
    json!({
        "__typename": "XDTGraphVideo",
        "is_video": true,
        "video_url": url,
        "display_url": format!("{}.cover.jpg", url)
    })
}

/// Serve a GraphQL answer for `shortcode` with a single media node
pub async fn mount_graphql_single(server: &MockServer, shortcode: &str, node: Value) {
    mount_graphql_body(server, shortcode, json!({ "data": { "xdt_shortcode_media": node }, "status": "ok" })).await;
}

/// Serve a GraphQL carousel answer for `shortcode`
pub async fn mount_graphql_carousel(server: &MockServer, shortcode: &str, nodes: Vec<Value>) {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    let body = json!({
        "data": { "xdt_shortcode_media": {
            "__typename": "XDTGraphSidecar",
            "is_video": false,
            "edge_sidecar_to_children": { "edges": edges }
        }},
        "status": "ok"
    });
    mount_graphql_body(server, shortcode, body).await;
}

pub async fn mount_graphql_body(server: &MockServer, shortcode: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains(shortcode))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `bytes` at `GET {route}`; returns the absolute URL
pub async fn mount_media(server: &MockServer, route: &str, bytes: Vec<u8>) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

/// Serve an HTML post page at `GET {route}`
pub async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Entries left in a working directory root after batches ran
pub fn leftover_entries(temp_root: &Path) -> usize {
    std::fs::read_dir(temp_root).map(|entries| entries.count()).unwrap_or(0)
}

/// Resolver returning a fixed list and counting calls
pub struct StubResolver {
    references: Vec<MediaReference>,
    pub calls: AtomicUsize,
}

impl StubResolver {
    pub fn new(references: Vec<MediaReference>) -> Self {
        Self {
            references,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaResolver for StubResolver {
    fn name(&self) -> &str {
        "stub"
    }

    async fn resolve(&self, _target: &PostTarget) -> AppResult<Vec<MediaReference>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.references.clone())
    }
}

/// Resolver that panics, standing in for any unexpected fault mid-batch
pub struct PanickingResolver;

#[async_trait]
impl MediaResolver for PanickingResolver {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn resolve(&self, _target: &PostTarget) -> AppResult<Vec<MediaReference>> {
        panic!("resolver exploded");
    }
}
