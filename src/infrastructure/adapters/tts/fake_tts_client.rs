//! Fake TTS Client - 用于测试的合成客户端
//!
//! 不调用外部服务，按文本生成确定性的伪音频并记录调用次数

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{AudioStream, SynthesisRequest, TtsEnginePort, TtsError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个输出块的字节数
    pub chunk_size: usize,
    /// 返回流之前的模拟延迟
    pub latency: Option<Duration>,
    /// 块与块之间的延迟
    pub chunk_delay: Option<Duration>,
    /// 是否总是失败
    pub fail: bool,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4,
            latency: None,
            chunk_delay: None,
            fail: false,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    /// 文本对应的伪音频
    pub fn audio_for(&self, text: &str) -> Vec<u8> {
        format!("ID3fake:{}", text).into_bytes()
    }

    /// 累计调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<AudioStream, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(text_len = request.text.len(), "FakeTtsClient: synthesizing");

        if let Some(latency) = self.config.latency {
            tokio::time::sleep(latency).await;
        }
        if self.config.fail {
            return Err(TtsError::ServiceError("fake failure".to_string()));
        }

        let audio = self.audio_for(&request.text);
        let chunks: Vec<Bytes> = audio
            .chunks(self.config.chunk_size.max(1))
            .map(Bytes::copy_from_slice)
            .collect();
        let delay = self.config.chunk_delay;

        Ok(stream::iter(chunks)
            .then(move |chunk| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, std::io::Error>(chunk)
            })
            .boxed())
    }
}
