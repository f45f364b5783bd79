use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "textgate")]
#[command(
    author,
    version,
    about = "Telegram bot that extracts, speaks and translates text from images",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Extract text from a local image file
    Ocr {
        /// Path to the image
        image: PathBuf,
    },

    /// Synthesize speech for the given text into an MP3 file
    Speak {
        /// Text to speak
        text: String,

        /// Output file
        #[arg(short, long, default_value = "speech.mp3")]
        output: PathBuf,

        /// Language code, defaults to TTS_LANGUAGE
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Translate text into another language
    Translate {
        /// Text to translate
        text: String,

        /// Target language code (e.g. es, fr, zh-CN)
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_webhook_flag() {
        let cli = Cli::try_parse_from(["textgate", "run", "--webhook"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run { webhook: true })));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["textgate"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_translate_args() {
        let cli = Cli::try_parse_from(["textgate", "translate", "Hello world", "--lang", "fr"]).unwrap();
        match cli.command {
            Some(Commands::Translate { text, lang }) => {
                assert_eq!(text, "Hello world");
                assert_eq!(lang, "fr");
            }
            _ => panic!("expected translate subcommand"),
        }
    }

    #[test]
    fn test_speak_defaults() {
        let cli = Cli::try_parse_from(["textgate", "speak", "hi"]).unwrap();
        match cli.command {
            Some(Commands::Speak { output, lang, .. }) => {
                assert_eq!(output, PathBuf::from("speech.mp3"));
                assert!(lang.is_none());
            }
            _ => panic!("expected speak subcommand"),
        }
    }
}
