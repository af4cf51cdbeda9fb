//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A one-shot dump of the effective pipeline configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::PipelineConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let path = shellexpand::tilde(log_file_path).to_string();
    let log_file = File::create(&path).map_err(|e| anyhow::anyhow!("Failed to create log file {}: {}", path, e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the pipeline configuration at application startup
pub fn log_pipeline_configuration(config: &PipelineConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Pipeline configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("  resolver:        {}", config.resolver.as_str());
    log::info!("  page timeout:    {}s", config.page_timeout.as_secs());
    log::info!("  api timeout:     {}s", config.api_timeout.as_secs());
    log::info!("  media timeout:   {}s", config.media_timeout.as_secs());
    log::info!("  chunk size:      {} bytes", config.chunk_size);
    log::info!("  temp root:       {}", config.temp_root.display());
    log::info!("  instagram:       {}", config.instagram_base_url);
    log::info!("  on item failure: {}", if config.stop_on_item_failure { "stop" } else { "continue" });

    if !config.temp_root.exists() {
        log::warn!(
            "TEMP_FILES_DIR {} does not exist yet; it will be created on the first batch",
            config.temp_root.display()
        );
    }
}
