use sesslog_types::{QueryFilter, SessionRecord, TokenMatcher, Tool, parse_record_timestamp};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

use super::schema::CodexLine;
use crate::{Error, Result};

/// Codex session source.
///
/// Layout: `~/.codex/sessions/<yyyy>/<mm>/<dd>/*.jsonl`, dated directories,
/// one rollout file per session, identity carried by a leading
/// `session_meta` line.
pub struct CodexSource {
    sessions_root: PathBuf,
}

impl CodexSource {
    /// Default root, honoring the `SESSLOG_CODEX_DIR` override.
    pub fn new() -> Self {
        if let Ok(root) = std::env::var("SESSLOG_CODEX_DIR") {
            return Self::with_root(PathBuf::from(root));
        }
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_root(home.join(".codex").join("sessions"))
    }

    pub fn with_root(sessions_root: PathBuf) -> Self {
        Self { sessions_root }
    }

    /// A candidate lives three numeric directories deep (year/month/day).
    fn is_dated_session_file(&self, path: &Path) -> bool {
        if path.extension().is_none_or(|ext| ext != "jsonl") {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.sessions_root) else {
            return false;
        };
        let components: Vec<&str> = relative
            .iter()
            .filter_map(|component| component.to_str())
            .collect();
        components.len() == 4
            && components[..3]
                .iter()
                .all(|dir| !dir.is_empty() && dir.chars().all(|ch| ch.is_ascii_digit()))
    }

    /// Fallback identity when no session_meta line exists: the trailing
    /// `-`-separated segment of the file stem.
    fn session_id_from_stem(path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        match stem.rsplit_once('-') {
            Some((_, tail)) => tail.to_string(),
            None => stem.to_string(),
        }
    }
}

impl Default for CodexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::SessionSource for CodexSource {
    fn tool(&self) -> Tool {
        Tool::Codex
    }

    fn list_candidate_files(&self) -> Vec<PathBuf> {
        if !self.sessions_root.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.sessions_root)
            .min_depth(4)
            .max_depth(4)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.path().to_path_buf())
            .filter(|path| self.is_dated_session_file(path))
            .collect();
        // Newest day first, matching how the directories are dated
        files.sort_by(|a, b| b.cmp(a));
        files
    }

    fn parse_session(
        &self,
        path: &Path,
        filter: Option<&QueryFilter>,
    ) -> Result<Option<SessionRecord>> {
        let file = File::open(path).map_err(|err| Error::from_io(err, path))?;
        let reader = BufReader::new(file);

        let mut matcher = filter
            .filter(|f| f.has_search())
            .map(|f| TokenMatcher::new(f.search_tokens()));

        let mut session_id = String::new();
        let mut cwd = String::new();
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

            let record: CodexLine = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(_) => continue,
            };
            parsed_lines += 1;

            match record {
                CodexLine::SessionMeta(meta) => {
                    session_id = meta.payload.id;
                    cwd = meta.payload.cwd;
                    start_time = meta.timestamp.as_deref().and_then(parse_record_timestamp);

                    // Identity and start are fixed by the meta line; both
                    // structured predicates can reject before the body.
                    if let Some(filter) = filter {
                        if filter.has_project()
                            && !sesslog_types::matches_project(&cwd, filter.project.trim())
                        {
                            return Ok(None);
                        }
                        if filter.has_date_range()
                            && start_time.is_some()
                            && !sesslog_types::matches_date_range(
                                start_time,
                                filter.since,
                                filter.until,
                            )
                        {
                            return Ok(None);
                        }
                    }
                }
                CodexLine::Message(message) => match message.role.as_str() {
                    "user" => {
                        message_count += 1;
                        let text = message.content.plain_text();
                        if !text.is_empty() {
                            if first_message.is_empty() {
                                first_message = truncate_chars(&text, 100);
                            }
                            if let Some(matcher) = matcher.as_mut()
                                && !matcher.is_satisfied()
                            {
                                matcher.feed(&text);
                            }
                            user_messages.push(text);
                        }
                        if let Some(ts) =
                            message.timestamp.as_deref().and_then(parse_record_timestamp)
                        {
                            last_time = Some(ts);
                        }
                    }
                    "assistant" => {
                        if model.is_empty()
                            && let Some(reported) = message.model
                        {
                            model = reported;
                        }
                        if let Some(matcher) = matcher.as_mut()
                            && !matcher.is_satisfied()
                        {
                            let text = message.content.plain_text();
                            if !text.is_empty() {
                                matcher.feed(&text);
                            }
                        }
                    }
                    _ => {}
                },
                CodexLine::Unknown => {}
            }
        }

        if content_lines > 0 && parsed_lines == 0 {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                message: "no parseable JSONL records".to_string(),
            });
        }

        if session_id.is_empty() {
            session_id = Self::session_id_from_stem(path);
        }

        if let Some(filter) = filter {
            if filter.has_project()
                && !sesslog_types::matches_project(&cwd, filter.project.trim())
            {
                return Ok(None);
            }
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

        Ok(Some(SessionRecord {
            tool: Tool::Codex,
            session_id,
            source_path: path.to_path_buf(),
            project_path: cwd,
            start_time,
            last_activity: last_time.or(start_time),
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
            let record: CodexLine = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(_) => continue,
            };
            let CodexLine::Message(message) = record else {
                continue;
            };
            if message.role != "user" && message.role != "assistant" {
                continue;
            }
            let text = message.content.plain_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(parts.join("\n"))
    }

    fn resume_command(&self, record: &SessionRecord) -> String {
        format!("codex --resume {}", record.session_id)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
