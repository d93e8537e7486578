//! HTTP TTS Client - 调用外部语音合成 HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部合成服务
//!
//! 外部合成 API:
//! POST http://localhost:8000/api/tts/synthesize
//! Request: {"text": "...", "format": "mp3", "voice": "Brian"}  (JSON)
//! Response: 音频二进制流

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Serialize;
use std::io;
use std::time::Duration;

use crate::application::ports::{AudioStream, SynthesisRequest, TtsEnginePort, TtsError};
use crate::domain::AudioFormat;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    format: AudioFormat,
    voice: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 合成服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），包含读取音频流的时间
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesize_url(&self) -> String {
        format!(
            "{}/api/tts/synthesize",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<AudioStream, TtsError> {
        let http_request = TtsHttpRequest {
            text: &request.text,
            format: request.format,
            voice: &request.voice,
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            format = %request.format,
            voice = %request.voice,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        if response.content_length() == Some(0) {
            return Err(TtsError::InvalidResponse("Empty audio stream".to_string()));
        }

        // 直接转发响应体字节流，不在内存中拼接
        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));

        Ok(stream.boxed())
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let client =
            HttpTtsClient::new(HttpTtsClientConfig::new("http://tts:9000/").with_timeout(5))
                .unwrap();
        assert_eq!(client.synthesize_url(), "http://tts:9000/api/tts/synthesize");
        assert_eq!(client.health_url(), "http://tts:9000/health");
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // 端口 9 (discard) 在测试环境中不会有 HTTP 服务
        let client = HttpTtsClient::new(HttpTtsClientConfig::new("http://127.0.0.1:9")).unwrap();
        let request = SynthesisRequest {
            text: "Hello".to_string(),
            format: AudioFormat::Mp3,
            voice: "Brian".to_string(),
        };
        assert!(client.synthesize(request).await.is_err());
        assert!(!client.health_check().await);
    }
}
