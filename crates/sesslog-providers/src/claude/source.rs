use sesslog_types::{QueryFilter, SessionRecord, TokenMatcher, Tool, parse_record_timestamp};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

use super::schema::ClaudeLine;
use crate::text::{is_punctuation_only, is_separator_line, is_short_title};
use crate::{Error, Result};

/// Message prefixes injected by tooling rather than typed by the user.
/// A session whose only "user" lines start with these has no manual input.
const SYSTEM_PREFIXES: &[&str] = &[
    "You are a Claude-Mem",
    "You are a specialized",
    "IMPORTANT:",
    "# Claude Code",
    "The user sent the following message",
    "PROGRESS SUMMARY CHECKPOINT",
    "## Progress Update",
    "SessionStart:",
    "UserPromptSubmit hook",
    "Caveat: The messages below",
];

const SYSTEM_TAG_PREFIXES: &[&str] = &[
    "<observed_from_primary_session>",
    "<what_happened>",
    "<local-command-caveat>",
    "<local-command-stdout>",
    "<local-command-",
    "<command-name>",
    "<system-reminder>",
];

/// Claude Code session source.
///
/// Layout: `~/.claude/projects/<encoded-project>/<session-id>.jsonl`, one
/// JSONL file per session, project encoded into the directory name.
pub struct ClaudeSource {
    projects_root: PathBuf,
}

impl ClaudeSource {
    /// Default root, honoring the `SESSLOG_CLAUDE_DIR` override.
    pub fn new() -> Self {
        if let Ok(root) = std::env::var("SESSLOG_CLAUDE_DIR") {
            return Self::with_root(PathBuf::from(root));
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_root(home.join(".claude").join("projects"))
    }

    pub fn with_root(projects_root: PathBuf) -> Self {
        Self { projects_root }
    }

    /// Decode the project path from the directory name Claude Code writes
    /// (`-Users-x-proj` encodes `/Users/x/proj`; the leading slash is
    /// dropped in the decoded form).
    fn project_path_for(path: &Path) -> String {
        let dir_name = path
            .parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str())
            .unwrap_or("");
        let decoded = dir_name.replace('-', "/");
        decoded.trim_start_matches('/').to_string()
    }

    fn is_manual_input(content: &str) -> bool {
        let stripped = content.trim();
        if stripped.is_empty() {
            return false;
        }
        if SYSTEM_PREFIXES
            .iter()
            .chain(SYSTEM_TAG_PREFIXES)
            .any(|prefix| stripped.starts_with(prefix))
        {
            return false;
        }
        !is_separator_line(stripped) && !is_punctuation_only(stripped)
    }
}

impl Default for ClaudeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::SessionSource for ClaudeSource {
    fn tool(&self) -> Tool {
        Tool::Claude
    }

    fn list_candidate_files(&self) -> Vec<PathBuf> {
        if !self.projects_root.is_dir() {
            return Vec::new();
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.projects_root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "jsonl") {
                continue;
            }
            if path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with('.'))
            {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        files
    }

    fn parse_session(
        &self,
        path: &Path,
        filter: Option<&QueryFilter>,
    ) -> Result<Option<SessionRecord>> {
        let project_path = Self::project_path_for(path);

        // Project scope is known from the directory alone; reject before
        // reading a single line.
        if let Some(filter) = filter
            && filter.has_project()
            && !sesslog_types::matches_project(&project_path, filter.project.trim())
        {
            return Ok(None);
        }

        let file = File::open(path).map_err(|err| Error::from_io(err, path))?;
        let reader = BufReader::new(file);

        let mut matcher = filter
            .filter(|f| f.has_search())
            .map(|f| TokenMatcher::new(f.search_tokens()));

        let mut start_time = None;
        let mut last_time = None;
        let mut message_count = 0usize;
        let mut first_message = String::new();
        let mut user_messages = Vec::new();
        let mut model = String::new();
        let mut parsed_lines = 0usize;
        let mut content_lines = 0usize;

        for line in reader.lines() {
            let line = line.map_err(|err| Error::from_io(err, path))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            content_lines += 1;

            let record: ClaudeLine = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(_) => continue, // malformed line: skip, keep the file
            };
            parsed_lines += 1;

            let envelope = match &record {
                ClaudeLine::User(envelope) | ClaudeLine::Assistant(envelope) => envelope,
                ClaudeLine::Unknown => continue,
            };

            if let Some(ts) = envelope
                .timestamp
                .as_deref()
                .and_then(parse_record_timestamp)
            {
                if start_time.is_none() {
                    start_time = Some(ts);

                    // Start time is fixed by the first stamped line, so a
                    // failing date bound can stop the read here.
                    if let Some(filter) = filter
                        && filter.has_date_range()
                        && !sesslog_types::matches_date_range(start_time, filter.since, filter.until)
                    {
                        return Ok(None);
                    }
                }
                last_time = Some(ts);
            }

            match record {
                ClaudeLine::User(envelope) => {
                    message_count += 1;
                    let text = envelope.message.content.plain_text();
                    if !text.is_empty() && Self::is_manual_input(&text) {
                        if first_message.is_empty() {
                            first_message = truncate_chars(&text, 100);
                        } else if is_short_title(&first_message) && !is_short_title(&text) {
                            // Upgrade a stub title ("ok", "?") to the first
                            // substantial message.
                            first_message = truncate_chars(&text, 100);
                        }
                        if let Some(matcher) = matcher.as_mut()
                            && !matcher.is_satisfied()
                        {
                            matcher.feed(&text);
                        }
                        user_messages.push(text);
                    }
                }
                ClaudeLine::Assistant(envelope) => {
                    if model.is_empty()
                        && let Some(reported) = envelope.message.model
                    {
                        model = reported;
                    }
                    if let Some(matcher) = matcher.as_mut()
                        && !matcher.is_satisfied()
                    {
                        let text = envelope.message.content.plain_text();
                        if !text.is_empty() {
                            matcher.feed(&text);
                        }
                    }
                }
                ClaudeLine::Unknown => {}
            }
        }

        if content_lines > 0 && parsed_lines == 0 {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: "no parseable JSONL records".to_string(),
            });
        }

        if let Some(filter) = filter {
            if filter.has_date_range()
                && !sesslog_types::matches_date_range(start_time, filter.since, filter.until)
            {
                return Ok(None);
            }
            if let Some(matcher) = &matcher
                && !matcher.is_satisfied()
            {
                return Ok(None);
            }
        }

        // Sessions without manual user input are noise (hook runs, warmups).
        if first_message.is_empty() {
            return Ok(None);
        }

        let metadata = std::fs::metadata(path).map_err(|err| Error::from_io(err, path))?;
        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs() as i64)
            .unwrap_or_default();

        let session_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Some(SessionRecord {
            tool: Tool::Claude,
            session_id,
            source_path: path.to_path_buf(),
            project_path,
            start_time,
            last_activity: last_time,
            message_count,
            first_message,
            summary: String::new(),
            file_size: metadata.len(),
            modified_at,
            model,
            user_messages,
        }))
    }

    fn extract_search_text(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|err| Error::from_io(err, path))?;
        let reader = BufReader::new(file);

        let mut parts = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|err| Error::from_io(err, path))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: ClaudeLine = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(_) => continue,
            };
            match record {
                ClaudeLine::User(envelope) => {
                    let text = envelope.message.content.plain_text();
                    if !text.is_empty() && Self::is_manual_input(&text) {
                        parts.push(text);
                    }
                }
                ClaudeLine::Assistant(envelope) => {
                    let text = envelope.message.content.plain_text();
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
                ClaudeLine::Unknown => {}
            }
        }
        Ok(parts.join("\n"))
    }

    fn resume_command(&self, record: &SessionRecord) -> String {
        format!("claude -r {}", record.session_id)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
