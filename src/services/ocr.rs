//! Tesseract-backed OCR engine
//!
//! The image is decoded first, so a broken upload fails fast with
//! `AppError::Image` instead of a cryptic Tesseract message. The decoded image
//! is written as grayscale PNG to a per-request temp file that is removed when
//! the request finishes, whatever the outcome.

use std::path::PathBuf;

use async_trait::async_trait;
use image::ImageFormat;
use tokio::process::Command;

use super::OcrEngine;
use crate::core::config;
use crate::core::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    bin: String,
    language: String,
    temp_dir: PathBuf,
}

impl TesseractOcr {
    pub fn new(bin: impl Into<String>, language: impl Into<String>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            language: language.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// Uses TESSERACT_BIN, OCR_LANGUAGE and TEMP_FILES_DIR.
    pub fn from_config() -> Self {
        Self::new(
            config::ocr::TESSERACT_BIN.as_str(),
            config::ocr::LANGUAGE.as_str(),
            config::TEMP_FILES_DIR.as_str(),
        )
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8]) -> AppResult<String> {
        let input = tempfile::Builder::new()
            .prefix("ocr-")
            .suffix(".png")
            .tempfile_in(&self.temp_dir)?;
        let input_path = input.path().to_path_buf();

        let bytes = image.to_vec();
        let png_path = input_path.clone();
        tokio::task::spawn_blocking(move || -> AppResult<()> {
            let decoded = image::load_from_memory(&bytes)?;
            log::debug!("Decoded {}x{} image for OCR", decoded.width(), decoded.height());
            decoded.grayscale().save_with_format(&png_path, ImageFormat::Png)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Ocr(format!("image decoding task failed: {}", e)))??;

        let output = Command::new(&self.bin)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await?;

        // `input` lives until here so the file exists for the whole Tesseract run
        drop(input);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Ocr(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                stderr.trim()
            )));
        }

        // Tesseract terminates each page with a form feed
        let text = String::from_utf8_lossy(&output.stdout).replace('\u{c}', "");
        Ok(text)
    }
}
