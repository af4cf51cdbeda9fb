//! Batch controller: one inbound link, one batch.
//!
//! validate → status message → extract → working dir → resolve
//!   → (download → deliver) per item → summary → cleanup
//!
//! Items are processed strictly one after another. The working directory is a
//! `TempDir` owned by the running batch, so it is removed on every exit path:
//! early error returns, panics unwinding through the batch, and the batch future
//! being dropped by its caller.

use crate::core::config::PipelineConfig;
use crate::core::error::{AppError, AppResult};
use crate::core::validation::validate_link;
use crate::download::downloader::MediaDownloader;
use crate::download::error::ResolutionError;
use crate::download::media::DeliveryResult;
use crate::download::shortcode::{extract_shortcode, PostTarget};
use crate::download::source::{build_resolver, MediaResolver};
use crate::telegram::delivery::deliver;
use crate::telegram::messages;
use crate::telegram::transport::{ChatTransport, StatusHandle};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Where a batch is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Validating,
    Extracting,
    Resolving,
    /// Working on the item at this 0-based index
    Delivering(usize),
    Completed,
    Failed,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchState::Completed | BatchState::Failed)
    }
}

/// Outcome of one batch, returned to the caller for logging and tests.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub state: BatchState,
    /// Per-item outcomes in resolution order (shorter than the item count when
    /// the batch stopped early)
    pub results: Vec<DeliveryResult>,
    /// Working directory used by the batch; it no longer exists once the
    /// report is returned
    pub working_dir: Option<PathBuf>,
    /// Status message reused for progress and the final text
    pub status: Option<StatusHandle>,
    /// Last text shown to the user
    pub final_message: Option<String>,
    /// Log label of the error that failed the batch
    pub error_category: Option<&'static str>,
}

impl BatchReport {
    pub fn delivered_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_delivered()).count()
    }
}

/// Runs batches against an injected resolver, downloader and config.
pub struct BatchController {
    resolver: Arc<dyn MediaResolver>,
    downloader: MediaDownloader,
    config: PipelineConfig,
}

impl BatchController {
    pub fn new(resolver: Arc<dyn MediaResolver>, downloader: MediaDownloader, config: PipelineConfig) -> Self {
        Self {
            resolver,
            downloader,
            config,
        }
    }

    /// Builds the resolver and downloader selected by `config`.
    pub fn from_config(config: PipelineConfig) -> AppResult<Self> {
        let resolver = build_resolver(&config)?;
        let downloader = MediaDownloader::new(&config)?;
        Ok(Self::new(resolver, downloader, config))
    }

    /// Process one inbound message. Never fails and never panics: every
    /// outcome ends in a terminal state with one final status text.
    pub async fn run(&self, text: &str, transport: &dyn ChatTransport) -> BatchReport {
        let mut report = BatchReport::default();

        let outcome = AssertUnwindSafe(self.execute(text, transport, &mut report))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::warn!(
                    "Batch failed in state {:?} [{}]: {}",
                    report.state,
                    e.category(),
                    e
                );
                report.error_category = Some(e.category());
                report.state = BatchState::Failed;
                self.show_final(transport, &mut report, e.user_message()).await;
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Batch panicked in state {:?}: {}", report.state, detail);
                report.error_category = Some("panic");
                report.state = BatchState::Failed;
                self.show_final(transport, &mut report, messages::UNEXPECTED_ERROR.to_string())
                    .await;
            }
        }

        if let Some(dir) = &report.working_dir {
            if dir.exists() {
                log::error!("Working directory {} survived the batch", dir.display());
            }
        }
        log::info!(
            "Batch finished: state={:?}, delivered {}/{}",
            report.state,
            report.delivered_count(),
            report.results.len()
        );
        report
    }

    async fn execute(&self, text: &str, transport: &dyn ChatTransport, report: &mut BatchReport) -> AppResult<()> {
        report.state = BatchState::Validating;
        let kind = validate_link(text)?;
        let url = text.trim().to_string();

        report.status = Some(transport.send_status(messages::PROCESSING).await?);

        report.state = BatchState::Extracting;
        let shortcode = extract_shortcode(&url)?;
        let target = PostTarget { url, shortcode, kind };
        log::info!("Batch for {} (shortcode={})", target.url, target.shortcode);

        let workdir = self.create_workdir()?;
        report.working_dir = Some(workdir.path().to_path_buf());

        report.state = BatchState::Resolving;
        let references = self.resolver.resolve(&target).await?;
        if references.is_empty() {
            return Err(ResolutionError::NoMediaFound.into());
        }

        let total = references.len();
        self.update_status(transport, report, &messages::found_items(total)).await;

        for (i, reference) in references.iter().enumerate() {
            report.state = BatchState::Delivering(i);
            let position = i + 1;

            let result = match self.downloader.download(reference, position, workdir.path()).await {
                Ok(item) => deliver(transport, &item, position, total).await,
                Err(e) => {
                    log::warn!("Download of item {}/{} failed [{}]: {}", position, total, e.category(), e);
                    DeliveryResult::Failed(e.user_message())
                }
            };

            let failed = !result.is_delivered();
            report.results.push(result);
            if failed && self.config.stop_on_item_failure && position < total {
                log::warn!("Stopping batch after failed item {}/{}", position, total);
                break;
            }
        }

        if report.delivered_count() == 0 {
            let reason = report
                .results
                .iter()
                .find_map(|r| match r {
                    DeliveryResult::Failed(reason) => Some(reason.clone()),
                    DeliveryResult::Delivered => None,
                })
                .unwrap_or_else(|| messages::UNEXPECTED_ERROR.to_string());
            report.error_category = Some("all_items_failed");
            report.state = BatchState::Failed;
            self.show_final(transport, report, reason).await;
        } else {
            report.state = BatchState::Completed;
            let summary = messages::batch_summary(total, &report.results);
            self.show_final(transport, report, summary).await;
        }

        if let Err(e) = workdir.close() {
            log::warn!("Failed to remove working directory: {}", e);
        }
        Ok(())
    }

    fn create_workdir(&self) -> AppResult<TempDir> {
        std::fs::create_dir_all(&self.config.temp_root)?;
        let dir = tempfile::Builder::new()
            .prefix("igrelay_")
            .tempdir_in(&self.config.temp_root)
            .map_err(AppError::Io)?;
        log::debug!("Working directory {}", dir.path().display());
        Ok(dir)
    }

    /// Edits the status message, or posts a new one when there is none yet or
    /// the edit is rejected.
    async fn update_status(&self, transport: &dyn ChatTransport, report: &mut BatchReport, text: &str) {
        if let Some(handle) = report.status {
            match transport.edit_status(handle, text).await {
                Ok(()) => return,
                Err(e) => log::warn!("Failed to edit status message: {}", e),
            }
        }
        match transport.send_status(text).await {
            Ok(handle) => report.status = Some(handle),
            Err(e) => log::error!("Failed to send status message: {}", e),
        }
    }

    async fn show_final(&self, transport: &dyn ChatTransport, report: &mut BatchReport, text: String) {
        self.update_status(transport, report, &text).await;
        report.final_message = Some(text);
    }
}
