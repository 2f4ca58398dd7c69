use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Source tool an indexed session came from.
///
/// The set is closed: adding a tool means adding a `SessionSource`
/// implementation and a variant here. The string key is what gets persisted
/// as the store's tool discriminator, so it must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Claude,
    Codex,
}

impl Tool {
    /// All known tools, in display order.
    pub const ALL: [Tool; 2] = [Tool::Claude, Tool::Codex];

    /// Stable string key used as the store discriminator.
    pub fn key(&self) -> &'static str {
        match self {
            Tool::Claude => "claude",
            Tool::Codex => "codex",
        }
    }

    /// Human-facing product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Claude => "Claude Code",
            Tool::Codex => "Codex",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Tool {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(Tool::Claude),
            "codex" => Ok(Tool::Codex),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown tool: {}",
                other
            ))),
        }
    }
}

/// One normalized conversation session derived from a tool-specific log file.
///
/// Records are produced fresh on every scan and never mutated in place; the
/// incremental indexer decides whether a record becomes an upsert, a skip,
/// or (when its backing file vanished) a deletion.
///
/// `source_path` is the only identity that is stable across re-scans.
/// `session_id` is unique only within a tool and must never be used as a
/// store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Which tool produced the backing file.
    pub tool: Tool,
    /// Tool-scoped session identifier (opaque).
    pub session_id: String,
    /// Absolute path of the backing log file; global identity.
    pub source_path: PathBuf,
    /// Project/workspace location associated with the session (may be empty).
    pub project_path: String,
    /// Session start, normalized to UTC-naive. Display code derives local
    /// time; comparisons always happen on this value.
    pub start_time: Option<NaiveDateTime>,
    /// Last activity, normalized to UTC-naive.
    pub last_activity: Option<NaiveDateTime>,
    /// Number of user messages observed in the file.
    pub message_count: usize,
    /// First manual user message, truncated for display.
    pub first_message: String,
    /// Session summary text; produced by a `Summarizer`, opaque here.
    pub summary: String,
    /// Backing file size in bytes (change-detection fingerprint).
    pub file_size: u64,
    /// Backing file mtime as epoch seconds (change-detection fingerprint).
    pub modified_at: i64,
    /// Model reported by the assistant, if any. Informational only.
    pub model: String,
    /// Manual user messages, in file order. Held in memory for the detail
    /// view and summarization; not persisted to the index.
    #[serde(skip)]
    pub user_messages: Vec<String>,
}

impl SessionRecord {
    /// Sort key for listings: last activity, falling back to start time.
    /// Records with neither sort last under descending order.
    pub fn activity_key(&self) -> Option<NaiveDateTime> {
        self.last_activity.or(self.start_time)
    }
}

/// Sort records newest-first by activity, records without timestamps last.
pub fn sort_newest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| b.activity_key().cmp(&a.activity_key()));
}
