//! Media resolution, download and batch orchestration

pub mod downloader;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod shortcode;
pub mod source;

// Re-exports for convenience
pub use downloader::MediaDownloader;
pub use error::{NetworkError, ResolutionError};
pub use media::{DeliveryResult, MediaItem, MediaKind, MediaReference};
pub use pipeline::{BatchController, BatchReport, BatchState};
pub use shortcode::{extract_shortcode, PostTarget};
pub use source::{build_resolver, MediaResolver};
