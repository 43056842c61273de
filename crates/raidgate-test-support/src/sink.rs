//! [`LineSink`] that keeps every record for later assertions.

use std::sync::{Mutex, MutexGuard};

use raidgate_pipeline::{LineRecord, LineSink};
use tracing::Level;

/// Owned copy of a [`LineRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLine {
    /// Line content.
    pub message: String,
    /// Step tag.
    pub tag: String,
    /// Severity.
    pub level: Level,
    /// Flushed without a trailing newline.
    pub partial: bool,
}

/// Collects records emitted by one or more taps.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<RecordedLine>>,
}

impl RecordingSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<RecordedLine> {
        self.lock().clone()
    }

    /// Messages recorded for `tag` at `level`, in emission order.
    #[must_use]
    pub fn messages(&self, tag: &str, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|record| record.tag == tag && record.level == level)
            .map(|record| record.message.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedLine>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LineSink for RecordingSink {
    fn emit(&self, record: &LineRecord<'_>) {
        self.lock().push(RecordedLine {
            message: record.message.to_string(),
            tag: record.tag.to_string(),
            level: record.level,
            partial: record.partial,
        });
    }
}
