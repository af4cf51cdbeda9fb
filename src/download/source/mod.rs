//! Media resolution backends.
//!
//! Provides the `MediaResolver` trait that turns a post link into an ordered
//! list of direct media references. Backends are interchangeable and picked
//! by configuration:
//! - `StructuredResolver`: Instagram GraphQL API, carousel aware
//! - `ScrapingResolver`: pattern matching over the raw post page, single item
//! - `FallbackResolver`: composes two resolvers, trying the second when the
//!   first one fails for a reason the second might not share

pub mod graphql;
pub mod scrape;

use crate::core::config::{PipelineConfig, ResolverKind};
use crate::core::error::{AppError, AppResult};
use crate::download::error::ResolutionError;
use crate::download::media::MediaReference;
use crate::download::shortcode::PostTarget;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use graphql::StructuredResolver;
pub use scrape::ScrapingResolver;

/// Trait for media resolver implementations.
///
/// A successful resolve returns at least one reference, in published order;
/// an empty post is reported as `ResolutionError::NoMediaFound` instead.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Human-readable name of this resolver (e.g., "structured", "scraping")
    fn name(&self) -> &str;

    /// Enumerate the media items behind `target`.
    async fn resolve(&self, target: &PostTarget) -> AppResult<Vec<MediaReference>>;
}

/// Build the resolver selected by `config.resolver`.
pub fn build_resolver(config: &PipelineConfig) -> AppResult<Arc<dyn MediaResolver>> {
    let resolver: Arc<dyn MediaResolver> = match config.resolver {
        ResolverKind::Structured => Arc::new(StructuredResolver::new(config)?),
        ResolverKind::Scraping => Arc::new(ScrapingResolver::new(config)?),
        ResolverKind::Fallback => Arc::new(FallbackResolver::new(
            Arc::new(StructuredResolver::new(config)?),
            Arc::new(ScrapingResolver::new(config)?),
        )),
    };
    log::info!("Media resolver: {}", resolver.name());
    Ok(resolver)
}

/// Shared HTTP client setup for resolvers: desktop identity and bounded timeouts.
pub(crate) fn http_client(user_agent: &str, timeout: Duration) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(crate::core::config::network::connect_timeout().min(timeout))
        .build()?;
    Ok(client)
}

/// Cuts a response body down to something that fits in a log line.
pub(crate) fn truncate_for_log(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Tries `primary`, then `secondary` when the primary failure is one the
/// secondary backend might not share.
pub struct FallbackResolver {
    primary: Arc<dyn MediaResolver>,
    secondary: Arc<dyn MediaResolver>,
    name: String,
}

impl FallbackResolver {
    pub fn new(primary: Arc<dyn MediaResolver>, secondary: Arc<dyn MediaResolver>) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }

    /// A private account stays private whichever way the page is read.
    fn should_fall_back(err: &AppError) -> bool {
        match err {
            AppError::Upstream(_) | AppError::Network(_) => true,
            AppError::Resolution(ResolutionError::NotFound | ResolutionError::NoMediaFound) => true,
            _ => false,
        }
    }
}

#[async_trait]
impl MediaResolver for FallbackResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, target: &PostTarget) -> AppResult<Vec<MediaReference>> {
        match self.primary.resolve(target).await {
            Ok(references) => Ok(references),
            Err(e) if Self::should_fall_back(&e) => {
                log::warn!(
                    "{} failed for {} ({}), falling back to {}",
                    self.primary.name(),
                    target.shortcode,
                    e,
                    self.secondary.name()
                );
                self.secondary.resolve(target).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::error::NetworkError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        result: fn() -> AppResult<Vec<MediaReference>>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, result: fn() -> AppResult<Vec<MediaReference>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MediaResolver for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn resolve(&self, _target: &PostTarget) -> AppResult<Vec<MediaReference>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn target() -> PostTarget {
        PostTarget::parse("https://www.instagram.com/p/ABC123/").unwrap()
    }

    fn one_photo() -> AppResult<Vec<MediaReference>> {
        Ok(vec![MediaReference::photo("https://cdn.example.com/1.jpg").unwrap()])
    }

    #[tokio::test]
    async fn test_fallback_used_on_upstream_error() {
        let primary = Fixed::new("structured", || Err(AppError::Upstream("rate limited".into())));
        let secondary = Fixed::new("scraping", one_photo);
        let resolver = FallbackResolver::new(primary.clone(), secondary.clone());

        let refs = resolver.resolve(&target()).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.name(), "structured+scraping");
    }

    #[tokio::test]
    async fn test_fallback_used_on_network_error() {
        let primary = Fixed::new("structured", || {
            Err(AppError::Network(NetworkError::Transport("reset".into())))
        });
        let secondary = Fixed::new("scraping", one_photo);
        let resolver = FallbackResolver::new(primary, secondary.clone());

        assert!(resolver.resolve(&target()).await.is_ok());
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_private_account_is_not_retried() {
        let primary = Fixed::new("structured", || Err(ResolutionError::PrivateAccount.into()));
        let secondary = Fixed::new("scraping", one_photo);
        let resolver = FallbackResolver::new(primary, secondary.clone());

        let err = resolver.resolve(&target()).await.unwrap_err();
        assert!(matches!(err, AppError::Resolution(ResolutionError::PrivateAccount)));
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = Fixed::new("structured", one_photo);
        let secondary = Fixed::new("scraping", one_photo);
        let resolver = FallbackResolver::new(primary, secondary.clone());

        resolver.resolve(&target()).await.unwrap();
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_resolver_names() {
        let mut config = PipelineConfig::default();
        assert_eq!(build_resolver(&config).unwrap().name(), "structured");
        config.resolver = ResolverKind::Scraping;
        assert_eq!(build_resolver(&config).unwrap().name(), "scraping");
        config.resolver = ResolverKind::Fallback;
        assert_eq!(build_resolver(&config).unwrap().name(), "structured+scraping");
    }

    #[test]
    fn test_truncate_for_log() {
        let long = "a".repeat(2000);
        assert_eq!(truncate_for_log(&long).len(), 500);
        assert_eq!(truncate_for_log("short"), "short");
    }
}
