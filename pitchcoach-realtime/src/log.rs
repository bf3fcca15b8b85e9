//! Append-only activity log rendered to the user.

use serde::{Deserialize, Serialize};

/// Who a log entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human trainee (transcribed speech).
    User,
    /// The synthesized counterpart.
    Assistant,
    /// Connection and lifecycle markers.
    System,
}

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Attribution of the entry.
    pub role: Role,
    /// Entry text.
    pub text: String,
}

/// Ordered, append-only sequence of log entries.
///
/// Entries are rendered in arrival order; there is no deduplication and no
/// editing of prior entries.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(LogEntry { role, text: text.into() });
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
