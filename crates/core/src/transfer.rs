//! Object transfer engine
//!
//! Streams object bodies between the storage service and local byte streams.
//! Data moves through a bounded buffer, so objects larger than memory can be
//! transferred.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::error::{Error, Result};
use crate::stream::ByteSink;
use crate::traits::{ObjectReader, ObjectStore};

/// Size of the intermediate buffer used for copies
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Content type of every uploaded object (RFC 2046)
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Receives the number of bytes moved by each step of a transfer
pub type ProgressCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Download an object into `sink`, returning the number of bytes copied
///
/// Nothing is written to the sink unless the object could be opened. The
/// sink is flushed on success; a failure mid-copy leaves whatever was
/// already written.
pub async fn get<S, W>(
    store: &S,
    bucket: &str,
    object: &str,
    sink: &mut W,
    progress: Option<&ProgressCallback>,
) -> Result<u64>
where
    S: ObjectStore + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    tracing::debug!(bucket, object, "downloading object");
    let body = store.open_object(bucket, object).await?;
    let count = copy_body(body, sink, progress).await?;
    tracing::debug!(bucket, object, bytes = count, "copied object data");
    Ok(count)
}

/// Download an object into a file or standard output
///
/// The sink is opened only once the object has been opened, so a missing
/// object or a rejected request leaves an existing output file untouched.
pub async fn download<S>(
    store: &S,
    bucket: &str,
    object: &str,
    sink: &ByteSink,
    progress: Option<&ProgressCallback>,
) -> Result<u64>
where
    S: ObjectStore + ?Sized,
{
    tracing::debug!(bucket, object, target = %sink, "downloading object");
    let body = store.open_object(bucket, object).await?;
    let mut writer = sink.open().await?;
    let count = copy_body(body, &mut writer, progress).await?;
    tracing::debug!(bucket, object, bytes = count, "copied object data");
    Ok(count)
}

async fn copy_body<W>(
    mut body: ObjectReader,
    sink: &mut W,
    progress: Option<&ProgressCallback>,
) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut count: u64 = 0;
    loop {
        let n = body
            .read(&mut buf)
            .await
            .map_err(|e| Error::Network(format!("Unable to read object data: {e}")))?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await?;
        count += n as u64;
        if let Some(progress) = progress {
            progress(n as u64);
        }
    }
    sink.flush().await?;
    Ok(count)
}

/// Upload everything readable from `source` as the object body
///
/// The source is consumed and closed on every path. Returns the number of
/// bytes read from it.
pub async fn put<S, R>(
    store: &S,
    bucket: &str,
    object: &str,
    source: R,
    progress: Option<&ProgressCallback>,
) -> Result<u64>
where
    S: ObjectStore + ?Sized,
    R: AsyncRead + Send + Unpin + 'static,
{
    tracing::debug!(bucket, object, "uploading object");
    let reader = CountingReader::new(source, progress.cloned());
    let stats = reader.stats();

    let result = store
        .put_object(bucket, object, Box::new(reader), OCTET_STREAM)
        .await;

    // A local read failure surfaces through the transport as a body error;
    // report the underlying IO error instead.
    if let Some(err) = stats.take_error() {
        return Err(Error::Io(err));
    }
    result?;

    let count = stats.bytes();
    tracing::debug!(bucket, object, bytes = count, "uploaded object data");
    Ok(count)
}

/// Remove an object
///
/// Removing an object that does not exist is an `ObjectNotFound` error.
pub async fn delete<S>(store: &S, bucket: &str, object: &str) -> Result<()>
where
    S: ObjectStore + ?Sized,
{
    store.delete_object(bucket, object).await?;
    tracing::debug!(bucket, object, "removed object from store");
    Ok(())
}

#[derive(Debug, Default)]
struct ReadStats {
    bytes: AtomicU64,
    error: Mutex<Option<(io::ErrorKind, String)>>,
}

impl ReadStats {
    fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    fn record(&self, err: &io::Error) {
        if let Ok(mut slot) = self.error.lock() {
            slot.get_or_insert_with(|| (err.kind(), err.to_string()));
        }
    }

    fn take_error(&self) -> Option<io::Error> {
        self.error
            .lock()
            .ok()?
            .take()
            .map(|(kind, msg)| io::Error::new(kind, msg))
    }
}

/// Reader adapter that counts bytes and remembers the first read error
struct CountingReader<R> {
    inner: R,
    stats: Arc<ReadStats>,
    progress: Option<ProgressCallback>,
}

impl<R> CountingReader<R> {
    fn new(inner: R, progress: Option<ProgressCallback>) -> Self {
        Self {
            inner,
            stats: Arc::new(ReadStats::default()),
            progress,
        }
    }

    fn stats(&self) -> Arc<ReadStats> {
        Arc::clone(&self.stats)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for CountingReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let n = (buf.filled().len() - before) as u64;
                if n > 0 {
                    this.stats.bytes.fetch_add(n, Ordering::Relaxed);
                    if let Some(progress) = &this.progress {
                        progress(n);
                    }
                }
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => {
                this.stats.record(&e);
                Poll::Ready(Err(e))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
