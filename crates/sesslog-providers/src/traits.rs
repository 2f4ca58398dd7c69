use sesslog_types::{QueryFilter, SessionRecord, Tool};
use std::path::{Path, PathBuf};

use crate::Result;
use crate::claude::ClaudeSource;
use crate::codex::CodexSource;

/// Capability contract one tool-specific source implements.
///
/// Responsibilities:
/// - Enumerate candidate session files under the tool's storage convention
/// - Parse a file into a normalized `SessionRecord`, applying a filter
///   inline so large non-matching files can be rejected early
/// - Produce the flattened search text the index stores per session
pub trait SessionSource: Send + Sync {
    /// Which tool this source reads. `Tool::key()` is the store discriminator.
    fn tool(&self) -> Tool;

    /// Human-facing tool name for listings.
    fn display_name(&self) -> &'static str {
        self.tool().display_name()
    }

    /// All session files under this tool's storage convention.
    /// A missing log root yields an empty list, not an error.
    fn list_candidate_files(&self) -> Vec<PathBuf>;

    /// Parse one session file in a single pass.
    ///
    /// Returns `Ok(None)` when the file holds no usable conversation or the
    /// given filter rejects it. Structured predicates are evaluated as soon
    /// as the relevant fields are known; search tokens are matched
    /// incrementally against message text as it is read. Malformed lines
    /// are skipped; a file with content but no parseable record at all is a
    /// parse error.
    fn parse_session(
        &self,
        path: &Path,
        filter: Option<&QueryFilter>,
    ) -> Result<Option<SessionRecord>>;

    /// Deterministic, idempotent concatenation of all searchable message
    /// text in file order. This is the search document the index stores.
    fn extract_search_text(&self, path: &Path) -> Result<String>;

    /// Shell command that resumes this session in the owning tool.
    fn resume_command(&self, record: &SessionRecord) -> String;
}

/// The closed registry of known sources.
///
/// Everything above the providers crate addresses sources through this set,
/// never through concrete types.
pub struct ProviderSet {
    sources: Vec<Box<dyn SessionSource>>,
}

impl ProviderSet {
    pub fn new(sources: Vec<Box<dyn SessionSource>>) -> Self {
        Self { sources }
    }

    /// All known tools with their default (env-overridable) log roots.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(ClaudeSource::new()),
            Box::new(CodexSource::new()),
        ])
    }

    /// Explicit roots, used by config wiring and tests.
    pub fn from_roots(claude_root: PathBuf, codex_root: PathBuf) -> Self {
        Self::new(vec![
            Box::new(ClaudeSource::with_root(claude_root)),
            Box::new(CodexSource::with_root(codex_root)),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SessionSource> {
        self.sources.iter().map(|source| source.as_ref())
    }

    pub fn get(&self, tool: Tool) -> Option<&dyn SessionSource> {
        self.sources
            .iter()
            .find(|source| source.tool() == tool)
            .map(|source| source.as_ref())
    }

    /// Sources in scope for a query; `None` means all tools.
    pub fn scoped(&self, tool: Option<Tool>) -> Vec<&dyn SessionSource> {
        self.iter()
            .filter(|source| tool.is_none_or(|t| source.tool() == t))
            .collect()
    }

    /// Resume command for a record, empty when the tool is unknown here.
    pub fn resume_command(&self, record: &SessionRecord) -> String {
        self.get(record.tool)
            .map(|source| source.resume_command(record))
            .unwrap_or_default()
    }

    /// Search text for a record's backing file via the owning source.
    pub fn search_text(&self, tool: Tool, path: &Path) -> Result<String> {
        match self.get(tool) {
            Some(source) => source.extract_search_text(path),
            None => Err(crate::Error::NotFound(path.to_path_buf())),
        }
    }
}
