//! Inbound loop: backend output lines to canonical operations.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;

use crate::dialect::DialectProfile;
use crate::types::operation::Operation;

/// Callback receiving each decoded operation, on the reader task.
pub type OperationHandler = Arc<dyn Fn(Operation) + Send + Sync>;

/// Counters reported when the reader loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Lines read from the backend.
    pub lines: u64,
    /// Operations handed to the handler.
    pub operations: u64,
}

/// Decodes backend output with a dialect and dispatches operations.
pub struct ReaderLoop {
    profile: Arc<DialectProfile>,
    handler: OperationHandler,
}

impl ReaderLoop {
    pub fn new(profile: Arc<DialectProfile>, handler: OperationHandler) -> Self {
        Self { profile, handler }
    }

    /// Decode one output line and dispatch it if it carries an operation.
    ///
    /// Returns the dispatched operation. Ordinary output yields `None`
    /// without any logging; tokens that fail canonicalization are logged by
    /// the profile and dropped.
    pub fn handle_line(&self, line: &str) -> Option<Operation> {
        if self.profile.is_diagnostic(line) {
            log::debug!("[{}] {}", self.profile.name(), line.trim_end());
        }
        let raw = self.profile.detect_operation(line)?;
        let operation = self.profile.canonicalize(raw)?;
        (self.handler)(operation.clone());
        Some(operation)
    }

    /// Read lines until end of stream, a read error, or `shutdown` fires
    /// (or its sender is dropped).
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and handled like
    /// any other line, so stray bytes from the backend never end the loop.
    pub async fn run<R>(self, source: R, mut shutdown: oneshot::Receiver<()>) -> ReaderStats
    where
        R: AsyncRead + Unpin,
    {
        let mut source = BufReader::new(source);
        let mut buf = Vec::new();
        let mut stats = ReaderStats::default();
        loop {
            buf.clear();
            tokio::select! {
                _ = &mut shutdown => {
                    log::debug!("[{}] reader loop stopped", self.profile.name());
                    break;
                }
                read = source.read_until(b'\n', &mut buf) => match read {
                    Ok(0) => {
                        log::debug!("[{}] output stream closed", self.profile.name());
                        break;
                    }
                    Ok(_) => {
                        stats.lines += 1;
                        let line = String::from_utf8_lossy(&buf);
                        if self.handle_line(&line).is_some() {
                            stats.operations += 1;
                        }
                    }
                    Err(e) => {
                        log::warn!("[{}] reading backend output failed: {}", self.profile.name(), e);
                        break;
                    }
                }
            }
        }
        stats
    }
}
