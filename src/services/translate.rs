//! Translation through the public Google Translate web endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::Translator;
use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Target languages offered in the /translate menu: (code, name, flag).
pub const LANGUAGES: &[(&str, &str, &str)] = &[
    ("en", "English", "🇬🇧"),
    ("es", "Spanish", "🇪🇸"),
    ("fr", "French", "🇫🇷"),
    ("de", "German", "🇩🇪"),
    ("it", "Italian", "🇮🇹"),
    ("pt", "Portuguese", "🇵🇹"),
    ("ru", "Russian", "🇷🇺"),
    ("hi", "Hindi", "🇮🇳"),
    ("ar", "Arabic", "🇸🇦"),
    ("ja", "Japanese", "🇯🇵"),
    ("ko", "Korean", "🇰🇷"),
    ("zh-CN", "Chinese", "🇨🇳"),
];

/// Display name of a supported language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name, _)| *name)
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str) -> AppResult<Self> {
        let client = Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Uses TRANSLATE_ENDPOINT.
    pub fn from_config() -> AppResult<Self> {
        Self::new(config::translate::ENDPOINT.as_str())
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        if text.trim().is_empty() {
            return Err(AppError::Translation("nothing to translate".to_string()));
        }

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

/// Joins the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["Hola ","Hello ",...],["mundo","world",...]],null,"en",...]`.
pub fn parse_translation(body: &Value) -> AppResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Translation("unexpected response shape".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(AppError::Translation("empty translation".to_string()));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_language_table() {
        assert_eq!(language_name("es"), Some("Spanish"));
        assert_eq!(language_name("zh-cn"), Some("Chinese"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_parse_translation_joins_segments() {
        let body = json!([[["Hola ", "Hello ", null, null, 10], ["mundo", "world", null, null, 10]], null, "en"]);
        assert_eq!(parse_translation(&body).unwrap(), "Hola mundo");
    }

    #[test]
    fn test_parse_translation_rejects_garbage() {
        assert!(parse_translation(&json!({"error": "nope"})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_translate_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("tl", "fr"))
            .and(query_param("sl", "auto"))
            .and(query_param("q", "Hello world"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["Bonjour le monde", "Hello world"]], null, "en"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(&format!("{}/translate_a/single", server.uri())).unwrap();
        assert_eq!(translator.translate("Hello world", "fr").await.unwrap(), "Bonjour le monde");
    }

    #[tokio::test]
    async fn test_translate_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(&format!("{}/translate_a/single", server.uri())).unwrap();
        let err = translator.translate("Hello", "de").await.unwrap_err();
        assert!(err.is_transient());
    }
}
