//! Speech synthesis through the Google Translate TTS endpoint
//!
//! The endpoint accepts short inputs only, so the text is split into chunks of
//! at most [`config::tts::MAX_CHUNK_CHARS`] characters on word boundaries. Each
//! chunk comes back as an MP3 stream; MP3 frames concatenate cleanly, so the
//! chunks are appended into one buffer.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::SpeechEngine;
use crate::core::config;
use crate::core::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    endpoint: Url,
    max_chunk_chars: usize,
}

impl GoogleTts {
    pub fn new(endpoint: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config::network::timeout())
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            max_chunk_chars: config::tts::MAX_CHUNK_CHARS,
        })
    }

    /// Uses TTS_ENDPOINT.
    pub fn from_config() -> AppResult<Self> {
        Self::new(config::tts::ENDPOINT.as_str())
    }

    async fn fetch_chunk(&self, chunk: &str, language: &str, idx: usize, total: usize) -> AppResult<Vec<u8>> {
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechEngine for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> AppResult<Vec<u8>> {
        let chunks = split_for_speech(text, self.max_chunk_chars);
        if chunks.is_empty() {
            return Err(AppError::Speech("nothing to speak".to_string()));
        }

        log::info!(
            "Synthesizing {} chars in {} chunk(s), language {}",
            text.chars().count(),
            chunks.len(),
            language
        );

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let part = self.fetch_chunk(chunk, language, idx, chunks.len()).await?;
            if part.is_empty() {
                return Err(AppError::Speech(format!("empty audio for chunk {}", idx)));
            }
            audio.extend_from_slice(&part);
        }

        Ok(audio)
    }
}

/// Normalizes whitespace and packs words into chunks of at most `max_chars` characters.
///
/// Words longer than `max_chars` are split hard.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
