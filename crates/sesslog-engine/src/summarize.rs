use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Produces the display summary for a session from its user messages.
///
/// Passed explicitly into whichever component fills `SessionRecord::summary`
/// so nothing reaches into process-wide state. An LLM-backed implementation
/// is an external collaborator behind this same trait; the core only stores
/// the string it is handed.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, messages: &[String]) -> String;
}

/// Deterministic extractive summary: the first few user messages as bullet
/// lines, long messages truncated, with a trailing count for the rest.
pub struct BulletSummarizer {
    max_messages: usize,
    max_chars: usize,
}

impl BulletSummarizer {
    pub fn new() -> Self {
        Self {
            max_messages: 5,
            max_chars: 60,
        }
    }
}

impl Default for BulletSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Summarizer for BulletSummarizer {
    fn summarize(&self, messages: &[String]) -> String {
        if messages.is_empty() {
            return "(no user messages)".to_string();
        }

        let mut lines = Vec::new();
        for message in messages.iter().take(self.max_messages) {
            let trimmed = message.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut line: String = trimmed.chars().take(self.max_chars).collect();
            if trimmed.chars().count() > self.max_chars {
                line.push_str("...");
            }
            lines.push(format!("• {}", line));
        }

        if messages.len() > self.max_messages {
            lines.push(format!(
                "  ... {} more messages",
                messages.len() - self.max_messages
            ));
        }

        if lines.is_empty() {
            "(no usable messages)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Content-addressed disk cache around any summarizer.
///
/// The key is a sha256 over the message list, one file per summary. Meant
/// for wrapping expensive summarizers (an LLM call); cache misses fall
/// through to the inner implementation and failures to read or write the
/// cache never fail summarization itself.
pub struct CachedSummarizer<S> {
    inner: S,
    cache_dir: PathBuf,
}

impl<S: Summarizer> CachedSummarizer<S> {
    pub fn new(inner: S, cache_dir: PathBuf) -> Self {
        Self { inner, cache_dir }
    }

    /// Platform cache location: `<cache_dir>/sesslog/summaries`.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sesslog")
            .join("summaries")
    }

    fn cache_key(messages: &[String]) -> String {
        let mut hasher = Sha256::new();
        for message in messages {
            hasher.update(message.as_bytes());
            // separator byte keeps ["ab","c"] distinct from ["a","bc"]
            hasher.update([0x1f]);
        }
        format!("{:x}", hasher.finalize())
    }
}

impl<S: Summarizer> Summarizer for CachedSummarizer<S> {
    fn summarize(&self, messages: &[String]) -> String {
        if messages.is_empty() {
            return self.inner.summarize(messages);
        }

        let cache_file = self
            .cache_dir
            .join(format!("{}.txt", Self::cache_key(messages)));
        if let Ok(cached) = std::fs::read_to_string(&cache_file) {
            return cached;
        }

        let summary = self.inner.summarize(messages);
        if std::fs::create_dir_all(&self.cache_dir).is_ok() {
            let _ = std::fs::write(&cache_file, &summary);
        }
        summary
    }
}
