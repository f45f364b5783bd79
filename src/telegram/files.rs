use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;

use crate::core::error::AppResult;
use crate::services::FileSource;

/// Downloads user uploads through the Bot API file endpoint.
#[derive(Clone)]
pub struct TelegramFiles {
    bot: Bot,
}

impl TelegramFiles {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl FileSource for TelegramFiles {
    async fn download(&self, file_id: &str) -> AppResult<Vec<u8>> {
        let file = self.bot.get_file(FileId(file_id.to_string())).await?;
        let mut buf = Vec::new();
        self.bot.download_file(&file.path, &mut buf).await?;
        log::debug!("Downloaded {} ({} bytes)", file.path, buf.len());
        Ok(buf)
    }
}
