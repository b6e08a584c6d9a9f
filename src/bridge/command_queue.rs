//! Outbound line buffer and its writer loop.
//!
//! Pushing never blocks: the simulation thread only takes a short mutex to
//! append to a `VecDeque`. A single writer task pops lines in FIFO order and
//! performs the (possibly slow) pipe writes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Notify;

use crate::utilities::config::DEFAULT_QUEUE_SOFT_LIMIT;

#[derive(Debug)]
struct QueueInner {
    lines: Mutex<VecDeque<String>>,
    notify: Notify,
    closed: AtomicBool,
    pushed: AtomicU64,
    soft_limit: usize,
}

/// Unbounded FIFO of protocol lines waiting to be written to the backend.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    inner: Arc<QueueInner>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_SOFT_LIMIT)
    }
}

impl CommandQueue {
    /// Create a queue that warns once more than `soft_limit` lines are waiting.
    pub fn new(soft_limit: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                lines: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                closed: AtomicBool::new(false),
                pushed: AtomicU64::new(0),
                soft_limit,
            }),
        }
    }

    /// Append a line to the tail. Returns immediately.
    ///
    /// Exceeding the soft limit only logs; nothing is ever dropped here.
    pub fn write_line(&self, line: impl Into<String>) {
        let line = line.into();
        if self.is_closed() {
            log::debug!("command queue closed, discarding {:?}", line);
            return;
        }
        let queued = {
            let mut lines = self.inner.lines.lock();
            lines.push_back(line);
            lines.len()
        };
        self.inner.pushed.fetch_add(1, Ordering::Relaxed);
        if queued > self.inner.soft_limit {
            log::warn!(
                "{} commands queued for the reasoning process (soft limit {})",
                queued,
                self.inner.soft_limit
            );
        }
        self.inner.notify.notify_one();
    }

    /// Remove and return the head line, if any.
    pub fn pop_front(&self) -> Option<String> {
        self.inner.lines.lock().pop_front()
    }

    /// Number of lines currently waiting.
    pub fn len(&self) -> usize {
        self.inner.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lines.lock().is_empty()
    }

    /// Lines accepted since creation, including those already written.
    pub fn total_pushed(&self) -> u64 {
        self.inner.pushed.load(Ordering::Relaxed)
    }

    pub fn soft_limit(&self) -> usize {
        self.inner.soft_limit
    }

    /// Drop every pending line.
    pub fn clear(&self) {
        self.inner.lines.lock().clear();
    }

    /// Stop accepting lines and wake the writer so it can exit.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Wait for the next line. `None` once the queue is closed.
    pub async fn next_line(&self) -> Option<String> {
        loop {
            if self.is_closed() {
                return None;
            }
            if let Some(line) = self.pop_front() {
                return Some(line);
            }
            self.inner.notify.notified().await;
        }
    }

    /// Writer loop: write each line followed by `\n` and flush, until the
    /// queue is closed or the sink fails. Hands the sink back on exit.
    ///
    /// A failed write closes and clears the queue, so nothing accumulates
    /// once the backend stops reading.
    pub async fn drain_into<W>(self, mut sink: W) -> W
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = self.next_line().await {
            if let Err(e) = write_one(&mut sink, &line).await {
                log::warn!("writing to reasoning process failed ({}), writer loop stops", e);
                self.close();
                self.clear();
                break;
            }
            log::trace!("sent {:?}", line);
        }
        log::debug!("writer loop exited");
        sink
    }
}

async fn write_one<W>(sink: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    sink.write_all(line.as_bytes()).await?;
    sink.write_all(b"\n").await?;
    sink.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    /// Sink whose every write fails like a closed pipe.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::default();
        queue.write_line("a");
        queue.write_line("b");
        queue.write_line("c");
        assert_eq!(queue.pop_front().as_deref(), Some("a"));
        assert_eq!(queue.pop_front().as_deref(), Some("b"));
        assert_eq!(queue.pop_front().as_deref(), Some("c"));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_soft_limit_never_drops() {
        let queue = CommandQueue::new(2);
        for i in 0..10 {
            queue.write_line(i.to_string());
        }
        assert_eq!(queue.len(), 10);
        assert_eq!(queue.total_pushed(), 10);
        assert_eq!(queue.pop_front().as_deref(), Some("0"));
    }

    #[test]
    fn test_total_pushed_survives_draining() {
        let queue = CommandQueue::default();
        queue.write_line("x");
        queue.pop_front();
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 1);
    }

    #[test]
    fn test_closed_queue_discards() {
        let queue = CommandQueue::default();
        queue.close();
        queue.write_line("late");
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let queue = CommandQueue::default();
        let other = queue.clone();
        other.write_line("shared");
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_next_line_wakes_on_push() {
        let queue = CommandQueue::default();
        let consumer = queue.clone();
        let task = tokio::spawn(async move { consumer.next_line().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.write_line("hello");
        let got = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_next_line_returns_none_after_close() {
        let queue = CommandQueue::default();
        let consumer = queue.clone();
        let task = tokio::spawn(async move { consumer.next_line().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.close();
        let got = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn test_writer_loop_writes_in_order() {
        let queue = CommandQueue::default();
        queue.write_line("<{enemy} --> [left]>. :|:");
        queue.write_line("<{SELF} --> [good]>! :|:");
        queue.write_line("5");

        let writer = tokio::spawn(queue.clone().drain_into(Vec::<u8>::new()));
        while !queue.is_empty() {
            tokio::task::yield_now().await;
        }
        queue.close();

        let written = tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "<{enemy} --> [left]>. :|:\n<{SELF} --> [good]>! :|:\n5\n"
        );
    }

    #[tokio::test]
    async fn test_failed_write_closes_queue() {
        let queue = CommandQueue::new(4);
        queue.write_line("first");
        queue.write_line("second");

        tokio::time::timeout(Duration::from_secs(1), queue.clone().drain_into(BrokenPipe))
            .await
            .unwrap();
        assert!(queue.is_closed());
        assert!(queue.is_empty());

        for i in 0..1000 {
            queue.write_line(i.to_string());
        }
        assert!(queue.is_empty());
        assert_eq!(queue.total_pushed(), 2);
    }
}
