//! Media model shared by resolvers, the downloader and delivery.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Attachment type a media item is delivered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// File extension used for the local copy
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

/// A direct link to one photo or video, as produced by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    kind: MediaKind,
    source_url: String,
}

impl MediaReference {
    /// Returns `None` for an empty (or whitespace-only) URL.
    pub fn new(kind: MediaKind, source_url: impl Into<String>) -> Option<Self> {
        let source_url = source_url.into().trim().to_string();
        if source_url.is_empty() {
            return None;
        }
        Some(Self { kind, source_url })
    }

    pub fn photo(source_url: impl Into<String>) -> Option<Self> {
        Self::new(MediaKind::Photo, source_url)
    }

    pub fn video(source_url: impl Into<String>) -> Option<Self> {
        Self::new(MediaKind::Video, source_url)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// A media reference materialized on local storage inside the batch
/// working directory.
#[derive(Debug)]
pub struct MediaItem {
    pub reference: MediaReference,
    pub local_path: PathBuf,
    pub size_bytes: u64,
}

impl MediaItem {
    pub fn kind(&self) -> MediaKind {
        self.reference.kind()
    }

    pub fn path(&self) -> &Path {
        &self.local_path
    }
}

/// Per-item outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered,
    /// Download or upload failed; carries the user-facing reason
    Failed(String),
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered)
    }
}
