//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A configuration summary logged once at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::{self, RequiredChats};

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

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

/// Logs the effective configuration at startup
pub fn log_startup_configuration(chats: &RequiredChats) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📋 Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📢 Required channel: {} ({})", chats.channel_id, chats.channel_link);
    log::info!("💬 Required group: {} ({})", chats.group_id, chats.group_link);
    log::info!(
        "🖼️  OCR: {} (lang: {})",
        config::ocr::TESSERACT_BIN.as_str(),
        config::ocr::LANGUAGE.as_str()
    );
    log::info!(
        "🔊 TTS: {} (lang: {})",
        config::tts::ENDPOINT.as_str(),
        config::tts::LANGUAGE.as_str()
    );
    log::info!("🌍 Translate: {}", config::translate::ENDPOINT.as_str());
    log::info!(
        "🗂️  Sessions: capacity {}, idle TTL {}s",
        *config::session::MAX_CAPACITY,
        *config::session::IDLE_TTL_SECS
    );

    if !tesseract_available() {
        log::warn!(
            "⚠️  {} not found on PATH - photo text extraction will fail",
            config::ocr::TESSERACT_BIN.as_str()
        );
    }
}

fn tesseract_available() -> bool {
    std::process::Command::new(config::ocr::TESSERACT_BIN.as_str())
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
