use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use igrelay::cli::{Cli, Commands};
use igrelay::core::{config, init_logger, log_pipeline_configuration, BotConfig, PipelineConfig};
use igrelay::download::{build_resolver, PostTarget};
use igrelay::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use igrelay::BatchController;

/// Number of `get_me` attempts while a (local) Bot API server is starting
const STARTUP_MAX_RETRIES: u32 = 60;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Log panics instead of letting them vanish inside dispatcher tasks
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) => run_bot().await,
        Some(Commands::Resolve { url, json }) => run_cli_resolve(url, json).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let config = BotConfig::from_env()?;
    log_pipeline_configuration(&config.pipeline);

    let bot = create_bot(&config)?;
    let bot_info = wait_for_bot_api(&bot).await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let controller = Arc::new(BatchController::from_config(config.pipeline)?);
    let deps = HandlerDeps::new(controller);

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Calls `get_me`, retrying while the Bot API is still initializing.
async fn wait_for_bot_api(bot: &Bot) -> Result<teloxide::types::Me> {
    let mut attempt = 0;
    loop {
        match bot.get_me().await {
            Ok(info) => return Ok(info),
            Err(e) => {
                let err_str = e.to_string();
                let is_retryable = err_str.contains("restart")
                    || err_str.contains("network")
                    || err_str.contains("connection")
                    || err_str.contains("timed out")
                    || err_str.contains("Connection refused");

                attempt += 1;
                if attempt >= STARTUP_MAX_RETRIES || !is_retryable {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} attempts: {}",
                        attempt,
                        e
                    ));
                }

                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying in 5 seconds...",
                    attempt,
                    STARTUP_MAX_RETRIES,
                    err_str
                );
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

/// Run CLI resolve command: validate, extract and resolve, then print
async fn run_cli_resolve(url: String, json: bool) -> Result<()> {
    let config = PipelineConfig::from_env()?;
    let target = PostTarget::parse(&url)?;
    let resolver = build_resolver(&config)?;
    let references = resolver.resolve(&target).await?;

    if json {
        let output = serde_json::json!({
            "url": target.url,
            "shortcode": target.shortcode,
            "resolver": resolver.name(),
            "media": references,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Shortcode: {}", target.shortcode);
        println!("Resolver: {}", resolver.name());
        println!("Items: {}", references.len());
        for (i, reference) in references.iter().enumerate() {
            println!("{:>3}. {:<5} {}", i + 1, reference.kind().as_str(), reference.source_url());
        }
    }
    Ok(())
}
