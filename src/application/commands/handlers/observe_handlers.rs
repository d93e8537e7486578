//! Observe Handler - 为查询文本签发标识符

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use std::sync::Arc;

use crate::application::commands::observe_commands::{ObserveTextCommand, ObserveTextResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::IdentifierIndexPort;
use crate::domain::normalize_text;

/// ObserveText Handler
///
/// 每次内联查询调用一次，返回嵌入结果卡片的音频 URL
pub struct ObserveTextHandler {
    identifier_index: Arc<dyn IdentifierIndexPort>,
    audio_endpoint: Url,
    max_length: usize,
}

impl ObserveTextHandler {
    pub fn new(
        identifier_index: Arc<dyn IdentifierIndexPort>,
        public_base_url: &str,
        max_length: usize,
    ) -> Result<Self, ApplicationError> {
        let endpoint = format!("{}/audio", public_base_url.trim_end_matches('/'));
        let audio_endpoint = Url::parse(&endpoint).map_err(|e| {
            ApplicationError::validation(format!("Invalid public base URL {}: {}", endpoint, e))
        })?;

        Ok(Self {
            identifier_index,
            audio_endpoint,
            max_length,
        })
    }

    /// 长度恰好等于上限的文本视为可接受，与 `/audio` 的 `len > max` 判定一致
    /// （早期的查询处理在 `len >= max` 时即拒绝）
    pub fn handle(&self, command: ObserveTextCommand) -> ObserveTextResponse {
        let identifier = self.identifier_index.observe(&command.text);
        let accepted = normalize_text(&command.text).len() <= self.max_length;

        tracing::debug!(
            identifier = %identifier,
            accepted = accepted,
            "Query text observed"
        );

        ObserveTextResponse {
            audio_url: self.url_with("telegram", identifier.as_str()),
            text_url: self.url_with("text", &STANDARD.encode(&command.text)),
            identifier,
            accepted,
        }
    }

    fn url_with(&self, key: &str, value: &str) -> String {
        let mut url = self.audio_endpoint.clone();
        url.query_pairs_mut().append_pair(key, value);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TextFingerprint;
    use crate::infrastructure::memory::InMemoryIdentifierIndex;
    use chrono::Duration;

    fn handler(max_length: usize) -> (ObserveTextHandler, Arc<InMemoryIdentifierIndex>) {
        let index = Arc::new(InMemoryIdentifierIndex::new(Duration::seconds(60)));
        let handler =
            ObserveTextHandler::new(index.clone(), "https://tts.example.org/", max_length).unwrap();
        (handler, index)
    }

    #[test]
    fn test_observe_builds_urls() {
        let (handler, index) = handler(64);
        let response = handler.handle(ObserveTextCommand {
            text: "Hello?".to_string(),
        });

        assert_eq!(response.identifier, TextFingerprint::of("hello?"));
        assert!(response.accepted);
        assert_eq!(
            response.audio_url,
            format!(
                "https://tts.example.org/audio?telegram={}",
                response.identifier
            )
        );
        // base64("Hello?") == "SGVsbG8/"
        assert_eq!(
            response.text_url,
            "https://tts.example.org/audio?text=SGVsbG8%2F"
        );
        assert_eq!(index.resolve(&response.identifier).as_deref(), Some("Hello?"));
    }

    #[test]
    fn test_observe_rejects_long_text_but_still_records() {
        let (handler, index) = handler(4);
        let response = handler.handle(ObserveTextCommand {
            text: "  abcd  ".to_string(),
        });
        assert!(response.accepted);

        let response = handler.handle(ObserveTextCommand {
            text: "abcde".to_string(),
        });
        assert!(!response.accepted);
        assert!(index.resolve(&response.identifier).is_some());
    }

    #[test]
    fn test_invalid_base_url() {
        let index = Arc::new(InMemoryIdentifierIndex::new(Duration::seconds(60)));
        assert!(ObserveTextHandler::new(index, "not a url", 64).is_err());
    }
}
