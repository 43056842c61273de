//! Line-buffered capture of subprocess output.
//!
//! # Design
//! - Chunks arrive at arbitrary boundaries; only newline-terminated lines are emitted.
//! - Completed lines are trimmed and blank ones dropped; a trailing fragment is kept
//!   until the next write or an explicit [`LineTap::flush`], which emits it verbatim.
//! - Records go to a [`LineSink`] so production code logs through `tracing` while
//!   tests capture records directly.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{Level, error};

/// One emitted line of subprocess output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// Line content; trimmed for completed lines, verbatim for flushed fragments.
    pub message: &'a str,
    /// Originating step name.
    pub tag: &'a str,
    /// Severity the line is logged at.
    pub level: Level,
    /// Set when the line was flushed without a trailing newline.
    pub partial: bool,
}

/// Destination for records produced by a [`LineTap`].
pub trait LineSink: Send + Sync {
    /// Accept a single record.
    fn emit(&self, record: &LineRecord<'_>);
}

/// Sink that forwards every record as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! emit_at {
    ($level:expr, $record:expr) => {
        if $record.partial {
            tracing::event!(
                $level,
                tag = $record.tag,
                partial_no_newline = true,
                "{}",
                $record.message
            );
        } else {
            tracing::event!($level, tag = $record.tag, "{}", $record.message);
        }
    };
}

impl LineSink for TracingSink {
    fn emit(&self, record: &LineRecord<'_>) {
        let level = record.level;
        if level == Level::ERROR {
            emit_at!(Level::ERROR, record);
        } else if level == Level::WARN {
            emit_at!(Level::WARN, record);
        } else if level == Level::DEBUG {
            emit_at!(Level::DEBUG, record);
        } else if level == Level::TRACE {
            emit_at!(Level::TRACE, record);
        } else {
            emit_at!(Level::INFO, record);
        }
    }
}

/// Streaming sink that turns byte chunks into tagged log records.
///
/// Safe to share between threads; writers serialise on an internal lock.
pub struct LineTap {
    tag: String,
    level: Level,
    sink: Arc<dyn LineSink>,
    buffer: Mutex<Vec<u8>>,
}

impl LineTap {
    /// Create a tap tagging every record with `tag` at `level`.
    #[must_use]
    pub fn new(tag: impl Into<String>, level: Level, sink: Arc<dyn LineSink>) -> Self {
        Self {
            tag: tag.into(),
            level,
            sink,
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Append `bytes`, emitting one record per completed non-blank line.
    ///
    /// Always consumes the whole input and returns its length.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let mut buffer = self.lock_buffer();
        buffer.extend_from_slice(bytes);

        let mut start = 0usize;
        while let Some(offset) = buffer[start..].iter().position(|byte| *byte == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&buffer[start..end]);
            self.emit_line(line.trim(), false);
            start = end + 1;
        }
        if start > 0 {
            buffer.drain(..start);
        }
        bytes.len()
    }

    /// Emit any buffered fragment, untrimmed, as a partial record and clear the buffer.
    ///
    /// No-op when nothing is buffered.
    pub fn flush(&self) {
        let mut buffer = self.lock_buffer();
        if buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        drop(buffer);
        self.record(&line, true);
    }

    fn emit_line(&self, message: &str, partial: bool) {
        if !message.is_empty() {
            self.record(message, partial);
        }
    }

    fn record(&self, message: &str, partial: bool) {
        self.sink.emit(&LineRecord {
            message,
            tag: &self.tag,
            level: self.level,
            partial,
        });
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!(tag = %self.tag, "line tap buffer mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}
