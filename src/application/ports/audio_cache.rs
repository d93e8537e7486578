//! Audio Cache Port - 持久化音频缓存
//!
//! 以文本指纹为 key 的内容寻址缓存，具体实现为文件系统目录
//! （每个指纹一个 `<fingerprint>.<ext>` 文件）。

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::io;
use thiserror::Error;

use crate::domain::TextFingerprint;

/// 音频字节流
///
/// 合成服务和缓存读取统一使用此类型，错误统一为 io::Error
pub type AudioStream = BoxStream<'static, io::Result<Bytes>>;

/// Audio Cache 错误
///
/// 每一步文件系统操作对应一个独立变体，便于向请求方返回具体失败步骤
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not create cache directory: {0}")]
    CreateDir(#[source] io::Error),

    #[error("Cannot open file (write): {0}")]
    OpenWrite(#[source] io::Error),

    #[error("Cannot open file (read): {0}")]
    OpenRead(#[source] io::Error),

    #[error("Cannot write file: {0}")]
    Write(#[source] io::Error),

    #[error("Cannot commit file: {0}")]
    Commit(#[source] io::Error),
}

impl CacheError {
    /// 返回给请求方的纯文本描述
    pub fn public_message(&self) -> &'static str {
        match self {
            CacheError::CreateDir(_) => "Could not create cache directory",
            CacheError::OpenWrite(_) => "Cannot open file (write)",
            CacheError::OpenRead(_) => "Cannot open file (read)",
            CacheError::Write(_) | CacheError::Commit(_) => "Cannot write file",
        }
    }
}

/// 已持久化的音频
pub struct AudioArtifact {
    pub fingerprint: TextFingerprint,
    pub size_bytes: u64,
    pub stream: AudioStream,
}

impl std::fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("fingerprint", &self.fingerprint)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// 单个缓存条目的写入器
///
/// 写入内容在 `commit` 之前对 `lookup` 不可见；`abort` 丢弃已写入的数据
#[async_trait]
pub trait ArtifactWriter: Send {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CacheError>;

    /// 提交写入，返回最终文件大小
    async fn commit(self: Box<Self>) -> Result<u64, CacheError>;

    async fn abort(self: Box<Self>);
}

/// Audio Cache Port
///
/// - 缓存 key: md5(normalize(text))
/// - 永久保存，本服务从不删除条目
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// 查找已持久化的音频，未命中返回 `Ok(None)`
    async fn lookup(&self, fingerprint: &TextFingerprint)
        -> Result<Option<AudioArtifact>, CacheError>;

    /// 为指纹打开一个写入器
    ///
    /// 缓存目录不存在时先创建
    async fn open_writer(
        &self,
        fingerprint: &TextFingerprint,
    ) -> Result<Box<dyn ArtifactWriter>, CacheError>;

    /// 将整个字节流写入缓存
    async fn store(
        &self,
        fingerprint: &TextFingerprint,
        mut stream: AudioStream,
    ) -> Result<u64, CacheError> {
        let mut writer = self.open_writer(fingerprint).await?;

        while let Some(chunk) = stream.next().await {
            let result = match chunk {
                Ok(chunk) => writer.write_chunk(&chunk).await,
                Err(e) => Err(CacheError::Write(e)),
            };
            if let Err(e) = result {
                writer.abort().await;
                return Err(e);
            }
        }

        writer.commit().await
    }
}
