//! File Audio Cache - 文件系统音频缓存实现
//!
//! 实现 AudioCachePort trait。每个指纹对应 `<audio_dir>/<fingerprint>.<ext>`，
//! 写入先落到同目录下的临时文件，提交时 rename 到最终路径。

use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::ReaderStream;

use crate::application::ports::{ArtifactWriter, AudioArtifact, AudioCachePort, CacheError};
use crate::domain::{AudioFormat, TextFingerprint};

/// 文件系统音频缓存
pub struct FileAudioCache {
    /// 缓存目录
    base_dir: PathBuf,
    format: AudioFormat,
    dir_ready: AtomicBool,
    /// 临时文件序号
    next_temp: AtomicU64,
}

impl FileAudioCache {
    /// 创建缓存，目录在第一次使用时创建
    pub fn new(base_dir: impl AsRef<Path>, format: AudioFormat) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            format,
            dir_ready: AtomicBool::new(false),
            next_temp: AtomicU64::new(0),
        }
    }

    /// 获取缓存目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 指纹对应的缓存文件路径
    pub fn artifact_path(&self, fingerprint: &TextFingerprint) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", fingerprint, self.format.extension()))
    }

    fn temp_path(&self, fingerprint: &TextFingerprint) -> PathBuf {
        let seq = self.next_temp.fetch_add(1, Ordering::Relaxed);
        self.base_dir.join(format!(
            ".{}.{}.{}-{}.tmp",
            fingerprint,
            self.format.extension(),
            std::process::id(),
            seq
        ))
    }

    /// 删除其他进程（通常是已退出的进程）遗留的临时文件
    ///
    /// 本进程的临时文件带有当前 pid，不会被删除
    async fn remove_stale_temp_files(&self) {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %self.base_dir.display(), error = %e, "Cannot scan cache directory");
                return;
            }
        };

        let own_pid = std::process::id();
        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(pid) = name.to_str().and_then(temp_file_pid) else {
                continue;
            };
            if pid == own_pid {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Failed to remove stale temp file")
                }
            }
        }

        if removed > 0 {
            tracing::info!(dir = %self.base_dir.display(), removed = removed, "Removed stale temp files");
        }
    }

    async fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.dir_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(CacheError::CreateDir)?;
        self.remove_stale_temp_files().await;
        self.dir_ready.store(true, Ordering::Release);

        tracing::debug!(dir = %self.base_dir.display(), "Audio cache directory ready");
        Ok(())
    }
}

#[async_trait]
impl AudioCachePort for FileAudioCache {
    async fn lookup(
        &self,
        fingerprint: &TextFingerprint,
    ) -> Result<Option<AudioArtifact>, CacheError> {
        self.ensure_dir().await?;

        let path = self.artifact_path(fingerprint);
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::OpenRead(e)),
        };

        let metadata = file.metadata().await.map_err(CacheError::OpenRead)?;
        if !metadata.is_file() {
            return Err(CacheError::OpenRead(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} is not a regular file", path.display()),
            )));
        }
        let size_bytes = metadata.len();

        Ok(Some(AudioArtifact {
            fingerprint: fingerprint.clone(),
            size_bytes,
            stream: ReaderStream::new(file).boxed(),
        }))
    }

    async fn open_writer(
        &self,
        fingerprint: &TextFingerprint,
    ) -> Result<Box<dyn ArtifactWriter>, CacheError> {
        self.ensure_dir().await?;

        let temp_path = self.temp_path(fingerprint);
        let file = fs::File::create(&temp_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                // 目录被外部删除，下次请求重新创建
                self.dir_ready.store(false, Ordering::Release);
            }
            CacheError::OpenWrite(e)
        })?;

        Ok(Box::new(FileArtifactWriter {
            file: BufWriter::new(file),
            temp_path,
            final_path: self.artifact_path(fingerprint),
            written: 0,
        }))
    }
}

/// 从 `.<fingerprint>.<ext>.<pid>-<seq>.tmp` 中取出 pid
fn temp_file_pid(name: &str) -> Option<u32> {
    let stem = name.strip_prefix('.')?.strip_suffix(".tmp")?;
    let (_, owner) = stem.rsplit_once('.')?;
    let (pid, seq) = owner.split_once('-')?;
    seq.parse::<u64>().ok()?;
    pid.parse().ok()
}

async fn finish(
    file: &mut BufWriter<fs::File>,
    temp_path: &Path,
    final_path: &Path,
) -> Result<(), CacheError> {
    file.flush().await.map_err(CacheError::Write)?;
    file.get_ref().sync_all().await.map_err(CacheError::Write)?;
    // 同一指纹并发写入时后提交者覆盖，内容相同
    fs::rename(temp_path, final_path)
        .await
        .map_err(CacheError::Commit)
}

/// 临时文件写入器
struct FileArtifactWriter {
    file: BufWriter<fs::File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

#[async_trait]
impl ArtifactWriter for FileArtifactWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CacheError> {
        self.file.write_all(chunk).await.map_err(CacheError::Write)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<u64, CacheError> {
        let FileArtifactWriter {
            mut file,
            temp_path,
            final_path,
            written,
        } = *self;

        if let Err(e) = finish(&mut file, &temp_path, &final_path).await {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::debug!(
            path = %final_path.display(),
            size_bytes = written,
            "Saved audio"
        );
        Ok(written)
    }

    async fn abort(self: Box<Self>) {
        let FileArtifactWriter { file, temp_path, .. } = *self;
        drop(file);
        if let Err(e) = fs::remove_file(&temp_path).await {
            tracing::debug!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioStream;
    use bytes::Bytes;
    use futures_util::stream;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn byte_stream(parts: &[&'static [u8]]) -> AudioStream {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    async fn read_all(artifact: AudioArtifact) -> Vec<u8> {
        let chunks: Vec<Bytes> = artifact.stream.map(|c| c.unwrap()).collect().await;
        chunks.concat()
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_store_and_lookup() {
        let temp_dir = tempdir().unwrap();
        let cache = FileAudioCache::new(temp_dir.path().join("audios"), AudioFormat::Mp3);
        let fp = TextFingerprint::of("Hello");

        // Miss
        assert!(cache.lookup(&fp).await.unwrap().is_none());

        // Store
        let size = cache
            .store(&fp, byte_stream(&[b"ID3", b"fake", b"audio"]))
            .await
            .unwrap();
        assert_eq!(size, 12);

        // Hit
        let artifact = cache.lookup(&fp).await.unwrap().unwrap();
        assert_eq!(artifact.size_bytes, 12);
        assert_eq!(read_all(artifact).await, b"ID3fakeaudio");

        // 文件名 = <fingerprint>.mp3，无临时文件残留
        assert_eq!(
            entries(cache.base_dir()),
            vec![format!("{}.mp3", fp)]
        );
    }

    #[tokio::test]
    async fn test_creates_directory_on_first_use() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("nested").join("audios");
        let cache = FileAudioCache::new(&dir, AudioFormat::Mp3);
        assert!(!dir.exists());

        cache.lookup(&TextFingerprint::of("x")).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_directory_creation_failure() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("audios");
        std::fs::write(&blocker, b"file in the way").unwrap();

        let cache = FileAudioCache::new(&blocker, AudioFormat::Mp3);
        let result = cache.lookup(&TextFingerprint::of("x")).await;
        assert!(matches!(result, Err(CacheError::CreateDir(_))));
    }

    #[tokio::test]
    async fn test_uncommitted_write_is_invisible() {
        let temp_dir = tempdir().unwrap();
        let cache = FileAudioCache::new(temp_dir.path(), AudioFormat::Mp3);
        let fp = TextFingerprint::of("Hello");

        let mut writer = cache.open_writer(&fp).await.unwrap();
        writer.write_chunk(b"partial").await.unwrap();
        assert!(cache.lookup(&fp).await.unwrap().is_none());

        writer.abort().await;
        assert!(cache.lookup(&fp).await.unwrap().is_none());
        assert!(entries(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_failed_stream_stores_nothing() {
        let temp_dir = tempdir().unwrap();
        let cache = FileAudioCache::new(temp_dir.path(), AudioFormat::Mp3);
        let fp = TextFingerprint::of("Hello");

        let failing: AudioStream = stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone")),
        ])
        .boxed();

        assert!(matches!(
            cache.store(&fp, failing).await,
            Err(CacheError::Write(_))
        ));
        assert!(cache.lookup(&fp).await.unwrap().is_none());
        assert!(entries(temp_dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_stores_same_fingerprint() {
        let temp_dir = tempdir().unwrap();
        let cache = Arc::new(FileAudioCache::new(temp_dir.path(), AudioFormat::Mp3));
        let fp = TextFingerprint::of("Hello");

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let fp = fp.clone();
                tokio::spawn(async move {
                    cache
                        .store(&fp, byte_stream(&[b"same", b" ", b"bytes"]))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let artifact = cache.lookup(&fp).await.unwrap().unwrap();
        assert_eq!(read_all(artifact).await, b"same bytes");
        assert_eq!(entries(temp_dir.path()).len(), 1);
    }

    #[tokio::test]
    async fn test_non_file_artifact_is_read_error() {
        let temp_dir = tempdir().unwrap();
        let cache = FileAudioCache::new(temp_dir.path(), AudioFormat::Mp3);
        let fp = TextFingerprint::of("Hello");
        std::fs::create_dir(cache.artifact_path(&fp)).unwrap();

        let result = cache.lookup(&fp).await;
        assert!(matches!(result, Err(CacheError::OpenRead(_))));
    }

    #[tokio::test]
    async fn test_stale_temp_files_removed_on_first_use() {
        let temp_dir = tempdir().unwrap();
        let fp = TextFingerprint::of("Hello");
        let stale = format!(".{}.mp3.{}-0.tmp", fp, u32::MAX);
        let own = format!(".{}.mp3.{}-7.tmp", fp, std::process::id());
        std::fs::write(temp_dir.path().join(&stale), b"half").unwrap();
        std::fs::write(temp_dir.path().join(&own), b"in progress").unwrap();
        std::fs::write(temp_dir.path().join("notes.tmp"), b"unrelated").unwrap();

        let cache = FileAudioCache::new(temp_dir.path(), AudioFormat::Mp3);
        assert!(cache.lookup(&fp).await.unwrap().is_none());

        assert_eq!(entries(temp_dir.path()), vec![own, "notes.tmp".to_string()]);
    }

    #[test]
    fn test_temp_file_pid() {
        assert_eq!(temp_file_pid(".abc.mp3.1234-5.tmp"), Some(1234));
        assert_eq!(temp_file_pid("abc.mp3"), None);
        assert_eq!(temp_file_pid(".abc.mp3.tmp"), None);
        assert_eq!(temp_file_pid(".abc.mp3.x-1.tmp"), None);
    }
}
