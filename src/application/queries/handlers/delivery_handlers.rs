//! Delivery Handler - 音频投递
//!
//! 流程: CacheLookup -> { Hit: 直接流式返回缓存文件, Miss: 调用合成服务 }
//!
//! 未命中时合成结果只读取一次，经 TeeStream 分流：
//! - 请求方通道：由独立的泵任务驱动，客户端断开后泵继续读完源流
//! - 持久化通道：独立任务写入缓存，失败只记录日志
//!
//! 长度限制只在 ResolveAudioHandler 中检查，这里不再重复。

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::error::DeliveryError;
use crate::application::inflight::{Claim, InFlightGuard, InFlightRegistry};
use crate::application::ports::{
    AudioArtifact, AudioCachePort, AudioStream, SynthesisRequest, TtsEnginePort,
};
use crate::application::queries::audio_queries::{AudioDelivery, AudioOrigin, ResolvedRequest};
use crate::application::tee::{persist_mirror, TeeStream};
use crate::domain::{AudioFormat, TextFingerprint};

/// 投递配置
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// 合成输出格式
    pub format: AudioFormat,
    /// 发音人
    pub voice: String,
    /// 请求方通道缓冲块数
    pub client_buffer: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            voice: "Brian".to_string(),
            client_buffer: 16,
        }
    }
}

/// 投递统计
#[derive(Debug, Default)]
pub struct DeliveryStats {
    hits: AtomicU64,
    misses: AtomicU64,
    synthesized: AtomicU64,
    coalesced: AtomicU64,
    persist_failures: AtomicU64,
}

/// 投递统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// 合成服务调用次数
    pub synthesized: u64,
    /// 等待其他请求合成后命中的次数
    pub coalesced: u64,
    pub persist_failures: u64,
}

impl DeliveryStats {
    pub fn snapshot(&self) -> DeliveryStatsSnapshot {
        DeliveryStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            synthesized: self.synthesized.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// DeliverAudio Handler
pub struct DeliverAudioHandler {
    audio_cache: Arc<dyn AudioCachePort>,
    tts_engine: Arc<dyn TtsEnginePort>,
    inflight: InFlightRegistry,
    stats: Arc<DeliveryStats>,
    config: DeliveryConfig,
}

impl DeliverAudioHandler {
    pub fn new(
        audio_cache: Arc<dyn AudioCachePort>,
        tts_engine: Arc<dyn TtsEnginePort>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            audio_cache,
            tts_engine,
            inflight: InFlightRegistry::new(),
            stats: Arc::new(DeliveryStats::default()),
            config,
        }
    }

    pub fn stats(&self) -> DeliveryStatsSnapshot {
        self.stats.snapshot()
    }

    pub async fn handle(&self, request: ResolvedRequest) -> Result<AudioDelivery, DeliveryError> {
        let fingerprint = TextFingerprint::of(&request.text);

        if let Some(artifact) = self.lookup(&request.text, &fingerprint).await? {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(self.serve_cached(artifact));
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        self.deliver_miss(request.text, fingerprint).await
    }

    /// 未命中后认领合成权，认领前其他请求可能已经提交
    async fn deliver_miss(
        &self,
        text: String,
        fingerprint: TextFingerprint,
    ) -> Result<AudioDelivery, DeliveryError> {
        let guard = match self.inflight.claim(&fingerprint) {
            Claim::Leader(guard) => {
                if let Some(artifact) = self.lookup(&text, &fingerprint).await? {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(self.serve_cached(artifact));
                }
                Some(guard)
            }
            Claim::Follower(waiter) => {
                tracing::debug!(fingerprint = %fingerprint, "Waiting for in-flight synthesis");
                waiter.wait().await;
                if let Some(artifact) = self.lookup(&text, &fingerprint).await? {
                    self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                    return Ok(self.serve_cached(artifact));
                }
                // leader 失败，自行合成
                None
            }
        };

        self.synthesize(text, fingerprint, guard).await
    }

    async fn lookup(
        &self,
        text: &str,
        fingerprint: &TextFingerprint,
    ) -> Result<Option<AudioArtifact>, DeliveryError> {
        self.audio_cache.lookup(fingerprint).await.map_err(|e| {
            tracing::error!(text = %text, fingerprint = %fingerprint, error = %e, "Cache lookup failed");
            DeliveryError::from(e)
        })
    }

    fn serve_cached(&self, artifact: AudioArtifact) -> AudioDelivery {
        tracing::info!(
            fingerprint = %artifact.fingerprint,
            size_bytes = artifact.size_bytes,
            source = "cache",
            "Serving audio"
        );
        AudioDelivery {
            fingerprint: artifact.fingerprint,
            origin: AudioOrigin::Cache,
            content_type: self.config.format.content_type(),
            size_bytes: Some(artifact.size_bytes),
            stream: artifact.stream,
        }
    }

    async fn synthesize(
        &self,
        text: String,
        fingerprint: TextFingerprint,
        guard: Option<InFlightGuard>,
    ) -> Result<AudioDelivery, DeliveryError> {
        // 写入器在调用合成服务之前打开，缓存不可写时不浪费合成调用
        let writer = self.audio_cache.open_writer(&fingerprint).await.map_err(|e| {
            tracing::error!(text = %text, fingerprint = %fingerprint, error = %e, "Cannot open cache writer");
            DeliveryError::from(e)
        })?;

        tracing::info!(text = %text, fingerprint = %fingerprint, source = "synthesis", "Serving audio");

        let request = SynthesisRequest {
            text: text.clone(),
            format: self.config.format,
            voice: self.config.voice.clone(),
        };
        self.stats.synthesized.fetch_add(1, Ordering::Relaxed);
        let source = match self.tts_engine.synthesize(request).await {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(text = %text, fingerprint = %fingerprint, error = %e, "Synthesis failed");
                writer.abort().await;
                return Err(DeliveryError::SynthesisFailed(e));
            }
        };

        let (tee, mirror) = TeeStream::new(source);

        let stats = self.stats.clone();
        let persist_fingerprint = fingerprint.clone();
        tokio::spawn(async move {
            // guard 持有到持久化结束，等待者随后重新查缓存
            let _guard = guard;
            match persist_mirror(mirror, writer).await {
                Ok(Some(size_bytes)) => tracing::debug!(
                    fingerprint = %persist_fingerprint,
                    size_bytes = size_bytes,
                    "Audio cached"
                ),
                Ok(None) => tracing::warn!(
                    fingerprint = %persist_fingerprint,
                    "Synthesis stream failed, cache write discarded"
                ),
                Err(e) => {
                    stats.persist_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        text = %text,
                        fingerprint = %persist_fingerprint,
                        error = %e,
                        "Failed to persist synthesized audio"
                    );
                }
            }
        });

        let (client_tx, client_rx) = mpsc::channel(self.config.client_buffer.max(1));
        tokio::spawn(pump(tee, client_tx, fingerprint.clone()));

        Ok(AudioDelivery {
            fingerprint,
            origin: AudioOrigin::Synthesis,
            content_type: self.config.format.content_type(),
            size_bytes: None,
            stream: receiver_stream(client_rx),
        })
    }
}

/// 驱动分流后的源流
///
/// 客户端断开后继续读完，保证持久化一侧拿到完整数据
async fn pump(
    mut tee: TeeStream<AudioStream>,
    client: mpsc::Sender<io::Result<Bytes>>,
    fingerprint: TextFingerprint,
) {
    let mut client_open = true;
    while let Some(item) = tee.next().await {
        if client_open && client.send(item).await.is_err() {
            tracing::debug!(fingerprint = %fingerprint, "Client disconnected, draining for cache");
            client_open = false;
        }
    }
}

fn receiver_stream(rx: mpsc::Receiver<io::Result<Bytes>>) -> AudioStream {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
}
