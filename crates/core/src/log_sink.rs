// crates/core/src/log_sink.rs
//! Bounded, ordered buffer of job log entries with an atomic drain.
//!
//! The running job appends; pollers drain. Delivery is destructive and
//! at-most-once: once drained, an entry is gone. If nobody polls for a while,
//! only the newest `capacity` entries survive.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Default number of entries kept between two drains.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "ERR")]
    Err,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Err => "ERR",
        }
    }
}

/// A single progress message emitted by a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "msg")]
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// FIFO log buffer shared between the running job and pollers.
///
/// Every operation takes the same lock, so an `append` racing a `drain`
/// lands wholly before or wholly after it.
#[derive(Debug)]
pub struct LogSink {
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl LogSink {
    /// Create a sink holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }

    /// Append an entry at the tail, evicting the oldest one when full.
    pub fn append(&self, message: impl Into<String>, level: LogLevel) {
        let entry = LogEntry::new(message, level);
        match entry.level {
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warn => tracing::warn!("{}", entry.message),
            LogLevel::Err => tracing::error!("{}", entry.message),
        }

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Info);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Warn);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.append(message, LogLevel::Err);
    }

    /// Take every buffered entry, oldest first, leaving the sink empty.
    pub fn drain(&self) -> Vec<LogEntry> {
        let mut entries = self.lock();
        std::mem::take(&mut *entries).into()
    }

    /// Discard all buffered entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A producer that panicked mid-append cannot leave the deque half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
