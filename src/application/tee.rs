//! Tee Stream - 字节流分流
//!
//! 合成结果只能读取一次，但要同时送往两个去处：
//! - 请求方（主流，由调用者驱动）
//! - 持久化（镜像，通过无界通道交给独立任务写盘）
//!
//! 镜像一侧的任何失败（写入器提前退出、通道关闭）只会让镜像脱离，
//! 主流不受影响。

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::application::ports::{ArtifactWriter, CacheError};

/// 镜像事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Chunk(Bytes),
    /// 源流正常结束
    Finished,
    /// 源流出错，镜像内容不完整
    Failed,
}

/// 把每个读取到的块镜像到第二个接收端的流包装
pub struct TeeStream<S> {
    inner: S,
    mirror: Option<mpsc::UnboundedSender<MirrorEvent>>,
}

impl<S> TeeStream<S> {
    pub fn new(inner: S) -> (Self, mpsc::UnboundedReceiver<MirrorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                inner,
                mirror: Some(tx),
            },
            rx,
        )
    }

    /// 镜像是否仍然连接
    pub fn is_mirroring(&self) -> bool {
        self.mirror.is_some()
    }

    fn send_mirror(&mut self, event: MirrorEvent) {
        let closed = match &self.mirror {
            Some(tx) => tx.send(event).is_err(),
            None => false,
        };
        if closed {
            tracing::debug!("Tee mirror receiver dropped, detaching");
            self.mirror = None;
        }
    }

    fn finish_mirror(&mut self, event: MirrorEvent) {
        self.send_mirror(event);
        self.mirror = None;
    }
}

impl<S> Stream for TeeStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = match this.inner.poll_next_unpin(cx) {
            Poll::Ready(item) => item,
            Poll::Pending => return Poll::Pending,
        };

        match &item {
            Some(Ok(chunk)) => this.send_mirror(MirrorEvent::Chunk(chunk.clone())),
            Some(Err(_)) => this.finish_mirror(MirrorEvent::Failed),
            None => this.finish_mirror(MirrorEvent::Finished),
        }

        Poll::Ready(item)
    }
}

/// 将镜像事件写入缓存写入器
///
/// - `Ok(Some(size))`: 已提交
/// - `Ok(None)`: 源流失败或中途被丢弃，写入已放弃
/// - `Err(_)`: 写入器自身失败
pub async fn persist_mirror(
    mut events: mpsc::UnboundedReceiver<MirrorEvent>,
    mut writer: Box<dyn ArtifactWriter>,
) -> Result<Option<u64>, CacheError> {
    while let Some(event) = events.recv().await {
        match event {
            MirrorEvent::Chunk(chunk) => {
                if let Err(e) = writer.write_chunk(&chunk).await {
                    writer.abort().await;
                    return Err(e);
                }
            }
            MirrorEvent::Finished => return writer.commit().await.map(Some),
            MirrorEvent::Failed => {
                writer.abort().await;
                return Ok(None);
            }
        }
    }

    // 发送端在源流结束前被丢弃
    writer.abort().await;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures_util::stream;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        data: Vec<u8>,
        committed: bool,
        aborted: bool,
    }

    struct MemoryWriter {
        recorded: Arc<Mutex<Recorded>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl ArtifactWriter for MemoryWriter {
        async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), CacheError> {
            if self.fail_writes {
                return Err(CacheError::Write(io::Error::new(
                    io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.recorded.lock().unwrap().data.extend_from_slice(chunk);
            Ok(())
        }

        async fn commit(self: Box<Self>) -> Result<u64, CacheError> {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.committed = true;
            Ok(recorded.data.len() as u64)
        }

        async fn abort(self: Box<Self>) {
            self.recorded.lock().unwrap().aborted = true;
        }
    }

    fn chunks(parts: &[&'static [u8]]) -> Vec<io::Result<Bytes>> {
        parts.iter().map(|p| Ok(Bytes::from_static(*p))).collect()
    }

    fn writer(fail_writes: bool) -> (Box<dyn ArtifactWriter>, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        (
            Box::new(MemoryWriter {
                recorded: recorded.clone(),
                fail_writes,
            }),
            recorded,
        )
    }

    #[tokio::test]
    async fn test_mirror_receives_every_chunk() {
        let source = stream::iter(chunks(&[b"ab", b"cd", b"e"]));
        let (tee, mut mirror) = TeeStream::new(source);

        let main: Vec<Bytes> = tee.map(|c| c.unwrap()).collect().await;
        assert_eq!(main.concat(), b"abcde");

        let mut mirrored = Vec::new();
        while let Some(event) = mirror.recv().await {
            mirrored.push(event);
        }
        assert_eq!(
            mirrored,
            vec![
                MirrorEvent::Chunk(Bytes::from_static(b"ab")),
                MirrorEvent::Chunk(Bytes::from_static(b"cd")),
                MirrorEvent::Chunk(Bytes::from_static(b"e")),
                MirrorEvent::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_mirror_does_not_affect_main_stream() {
        let source = stream::iter(chunks(&[b"ab", b"cd"]));
        let (mut tee, mirror) = TeeStream::new(source);
        drop(mirror);

        let first = tee.next().await.unwrap().unwrap();
        assert_eq!(first, Bytes::from_static(b"ab"));
        assert!(!tee.is_mirroring());
        let second = tee.next().await.unwrap().unwrap();
        assert_eq!(second, Bytes::from_static(b"cd"));
        assert!(tee.next().await.is_none());
    }

    #[tokio::test]
    async fn test_source_error_marks_mirror_failed() {
        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "provider hung up")),
        ]);
        let (tee, mirror) = TeeStream::new(source);
        let (writer, recorded) = writer(false);

        let main: Vec<io::Result<Bytes>> = tee.collect().await;
        assert!(main[1].is_err());

        let result = persist_mirror(mirror, writer).await.unwrap();
        assert_eq!(result, None);
        let recorded = recorded.lock().unwrap();
        assert!(recorded.aborted);
        assert!(!recorded.committed);
    }

    #[tokio::test]
    async fn test_persist_mirror_commits_complete_stream() {
        let source = stream::iter(chunks(&[b"hello ", b"world"]));
        let (tee, mirror) = TeeStream::new(source);
        let (writer, recorded) = writer(false);

        let persist = tokio::spawn(persist_mirror(mirror, writer));
        let _: Vec<_> = tee.collect().await;

        assert_eq!(persist.await.unwrap().unwrap(), Some(11));
        let recorded = recorded.lock().unwrap();
        assert!(recorded.committed);
        assert_eq!(recorded.data, b"hello world");
    }

    #[tokio::test]
    async fn test_writer_failure_is_isolated_from_main_stream() {
        let source = stream::iter(chunks(&[b"ab", b"cd", b"ef"]));
        let (tee, mirror) = TeeStream::new(source);
        let (writer, recorded) = writer(true);

        let persist = tokio::spawn(persist_mirror(mirror, writer));
        let main: Vec<Bytes> = tee.map(|c| c.unwrap()).collect().await;
        assert_eq!(main.concat(), b"abcdef");

        let result = persist.await.unwrap();
        assert!(matches!(result, Err(CacheError::Write(_))));
        assert!(recorded.lock().unwrap().aborted);
    }

    #[tokio::test]
    async fn test_abandoned_source_aborts_write() {
        let source = stream::iter(chunks(&[b"ab", b"cd"]));
        let (mut tee, mirror) = TeeStream::new(source);
        let (writer, recorded) = writer(false);

        let _ = tee.next().await;
        drop(tee);

        assert_eq!(persist_mirror(mirror, writer).await.unwrap(), None);
        assert!(recorded.lock().unwrap().aborted);
    }
}
