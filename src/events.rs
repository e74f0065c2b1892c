//! Structured pipeline log events.
//!
//! Every pipeline step emits timestamped entries that the caller consumes
//! for progress display (an observer pattern over boxed sinks). Emission is
//! a side effect only; it never influences control flow. Entries are
//! mirrored onto the `log` facade.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One caller-facing log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            level,
        }
    }
}

/// Observer receiving pipeline log entries.
pub trait EventSink: Send + Sync {
    fn on_log(&self, entry: &LogEntry);
}

/// Dispatches log entries to registered sinks.
pub struct EventBus {
    sinks: RwLock<HashMap<usize, Box<dyn EventSink>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Register a sink. Returns an id usable for later removal.
    pub fn add_sink(&self, sink: Box<dyn EventSink>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut sinks = self.sinks.write().unwrap();
        sinks.insert(id, sink);
        id
    }

    /// Remove a previously registered sink.
    pub fn remove_sink(&self, id: usize) -> Option<Box<dyn EventSink>> {
        let mut sinks = self.sinks.write().unwrap();
        sinks.remove(&id)
    }

    /// Emit one entry to every sink and to the `log` facade.
    pub fn emit(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        match entry.level {
            LogLevel::Info | LogLevel::Success => log::info!("{}", entry.message),
            LogLevel::Warning => log::warn!("{}", entry.message),
            LogLevel::Error => log::error!("{}", entry.message),
        }
        let sinks = self.sinks.read().unwrap();
        for sink in sinks.values() {
            sink.on_log(&entry);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(LogLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink that collects entries in memory, for tests and log consoles.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Messages at the given level, in emission order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn on_log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
