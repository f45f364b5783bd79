use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::update_listeners::webhooks;
use tokio::time::sleep;

use textgate::cli::{Cli, Commands};
use textgate::core::{config, init_logger, log_startup_configuration, RequiredChats};
use textgate::services::{
    GoogleTranslator, GoogleTts, OcrEngine, SpeechEngine, TelegramMembership, TesseractOcr, Translator,
};
use textgate::telegram::{
    create_bot, schema, setup_bot_commands, HandlerContext, HandlerDeps, HandlerError, Router, TelegramFiles,
};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the requested subcommand; without
/// one the bot runs in long polling mode.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them
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

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { webhook }) => {
            log::info!("Running bot (webhook: {})", webhook);
            run_bot(webhook).await
        }
        Some(Commands::Ocr { image }) => run_cli_ocr(image).await,
        Some(Commands::Speak { text, output, lang }) => run_cli_speak(text, output, lang).await,
        Some(Commands::Translate { text, lang }) => run_cli_translate(text, lang).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(false).await
        }
    }
}

async fn run_cli_ocr(image: PathBuf) -> Result<()> {
    let bytes = tokio::fs::read(&image).await?;
    let text = TesseractOcr::from_config().recognize(&bytes).await?;
    if text.trim().is_empty() {
        log::warn!("No text detected in {}", image.display());
    }
    println!("{}", text.trim_end());
    Ok(())
}

async fn run_cli_speak(text: String, output: PathBuf, lang: Option<String>) -> Result<()> {
    let lang = lang.unwrap_or_else(|| config::tts::LANGUAGE.clone());
    let audio = GoogleTts::from_config()?.synthesize(&text, &lang).await?;
    tokio::fs::write(&output, &audio).await?;
    log::info!("Wrote {} bytes of audio to {}", audio.len(), output.display());
    Ok(())
}

async fn run_cli_translate(text: String, lang: String) -> Result<()> {
    let translated = GoogleTranslator::from_config()?.translate(&text, &lang).await?;
    println!("{}", translated);
    Ok(())
}

/// Retries getMe while the Bot API is unreachable or still starting.
async fn wait_for_bot_api(bot: &Bot) -> Result<Me> {
    let mut attempt = 0;
    loop {
        match bot.get_me().await {
            Ok(me) => return Ok(me),
            Err(e) => {
                let err_str = e.to_string();
                let is_retryable = err_str.contains("restart")
                    || err_str.contains("network")
                    || err_str.contains("connection")
                    || err_str.contains("timed out")
                    || err_str.contains("Connection refused");

                attempt += 1;
                if attempt >= config::retry::STARTUP_MAX_RETRIES || !is_retryable {
                    return Err(anyhow::anyhow!(
                        "Failed to connect to Bot API after {} attempts: {}",
                        attempt,
                        e
                    ));
                }

                log::warn!(
                    "Bot API not ready (attempt {}/{}): {}. Retrying...",
                    attempt,
                    config::retry::STARTUP_MAX_RETRIES,
                    err_str
                );
                sleep(config::retry::startup_delay()).await;
            }
        }
    }
}

async fn run_bot(use_webhook: bool) -> Result<()> {
    let started = Instant::now();
    log::info!("Starting bot...");

    let chats = RequiredChats::from_env()?;
    log_startup_configuration(&chats);

    let bot = create_bot()?;
    let me = wait_for_bot_api(&bot).await?;
    log::info!("Bot username: {:?}, Bot ID: {}", me.username, me.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to publish bot commands: {}", e);
    }

    let ctx = HandlerContext::new(
        chats,
        Arc::new(TelegramMembership::new(bot.clone())),
        Arc::new(TelegramFiles::new(bot.clone())),
        Arc::new(TesseractOcr::from_config()),
        Arc::new(GoogleTts::from_config()?),
        Arc::new(GoogleTranslator::from_config()?),
    );
    let router = Arc::new(Router::with_default_handlers(ctx));
    let handler = schema(HandlerDeps::new(router, me.username.clone(), me.id));

    log::info!("================================================");
    log::info!("🎉 Bot initialization complete in {:.2}s", started.elapsed().as_secs_f64());
    log::info!("================================================");

    if use_webhook {
        run_webhook(bot, handler).await
    } else {
        run_polling(bot, handler).await
    }
}

async fn run_webhook(bot: Bot, handler: UpdateHandler<HandlerError>) -> Result<()> {
    let Some(raw_url) = config::WEBHOOK_URL.as_deref() else {
        anyhow::bail!("--webhook requires WEBHOOK_URL to be set");
    };
    let url = url::Url::parse(raw_url)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], *config::WEBHOOK_PORT));
    log::info!("Starting bot in webhook mode at {} (listening on {})", url, addr);

    let listener = webhooks::axum(bot.clone(), webhooks::Options::new(addr, url)).await?;

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the webhook listener"),
        )
        .await;

    Ok(())
}

/// Long polling; the dispatcher runs in its own task and is restarted after a panic.
async fn run_polling(bot: Bot, handler: UpdateHandler<HandlerError>) -> Result<()> {
    log::info!("Starting bot in long polling mode");
    let mut retry_count = 0;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                return Ok(());
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= config::retry::MAX_DISPATCHER_RETRIES {
                    anyhow::bail!("Dispatcher panicked {} times, giving up", retry_count + 1);
                }
                retry_count += 1;
                log::info!(
                    "Restarting dispatcher (attempt {}/{})...",
                    retry_count,
                    config::retry::MAX_DISPATCHER_RETRIES
                );
                sleep(config::retry::dispatcher_delay(retry_count)).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                return Ok(());
            }
        }
    }
}
