use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Conjunction of optional session predicates.
///
/// The same filter is evaluated two ways: inline during a streaming scan
/// (structured checks plus the incremental [`TokenMatcher`]) and translated
/// into store clauses by the query engine. Both evaluations must accept and
/// reject the same records; divergence is an index-correctness bug, not a
/// cosmetic one.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Free-text search; whitespace-separated tokens, all must match.
    pub search: String,
    /// Case-insensitive substring of the project path.
    pub project: String,
    /// Inclusive lower bound on session start (UTC-naive).
    pub since: Option<NaiveDateTime>,
    /// Inclusive upper bound on session start (UTC-naive).
    pub until: Option<NaiveDateTime>,
}

impl QueryFilter {
    pub fn has_search(&self) -> bool {
        !self.search.trim().is_empty()
    }

    pub fn has_project(&self) -> bool {
        !self.project.trim().is_empty()
    }

    pub fn has_date_range(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_search() && !self.has_project() && !self.has_date_range()
    }

    /// Lowercased search tokens, empty when no search is active.
    pub fn search_tokens(&self) -> Vec<String> {
        search_tokens(&self.search)
    }

    /// Structured predicates only (project + date range); text search is
    /// evaluated separately through the token matcher.
    pub fn matches_metadata(
        &self,
        project_path: &str,
        start_time: Option<NaiveDateTime>,
    ) -> bool {
        if self.has_project() && !matches_project(project_path, self.project.trim()) {
            return false;
        }
        if self.has_date_range() && !matches_date_range(start_time, self.since, self.until) {
            return false;
        }
        true
    }
}

/// Split a search query into lowercase tokens.
pub fn search_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

/// Translate a search query into an FTS5 MATCH expression.
///
/// Tokens become quoted prefix phrases joined with AND: `"alpha"* AND
/// "beta"*`. Quoting keeps FTS operators in user input inert; the prefix
/// star brings token matching close to the streaming matcher's substring
/// containment. Returns None when the query holds no tokens.
pub fn fts_match_expr(query: &str) -> Option<String> {
    let tokens = search_tokens(query);
    if tokens.is_empty() {
        return None;
    }
    let phrases: Vec<String> = tokens
        .iter()
        .map(|token| format!("\"{}\"*", token.replace('"', "\"\"")))
        .collect();
    Some(phrases.join(" AND "))
}

/// Case-insensitive substring check on the project path. An empty query
/// always matches.
pub fn matches_project(project_path: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    project_path.to_lowercase().contains(&query.to_lowercase())
}

/// Inclusive date-range check on a session's start time.
///
/// A session with no start time is excluded whenever either bound is set:
/// an unknown start cannot be said to fall inside a range.
pub fn matches_date_range(
    start_time: Option<NaiveDateTime>,
    since: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
) -> bool {
    if since.is_none() && until.is_none() {
        return true;
    }
    let Some(start) = start_time else {
        return false;
    };
    if let Some(since) = since
        && start < since
    {
        return false;
    }
    if let Some(until) = until
        && start > until
    {
        return false;
    }
    true
}

/// Incremental AND-matcher over streamed text chunks.
///
/// Free text arrives line by line while a session file is parsed, so the
/// matcher accumulates hits across chunks instead of requiring the full
/// text up front. Callers should stop feeding once `feed` returns true;
/// feeding further chunks is a no-op.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    tokens: Vec<String>,
    found: HashSet<usize>,
}

impl TokenMatcher {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            found: HashSet::new(),
        }
    }

    pub fn from_query(query: &str) -> Self {
        Self::new(search_tokens(query))
    }

    /// Whether a search filter is active at all. An inactive matcher is
    /// satisfied by definition but reports no match activity.
    pub fn is_active(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// All active tokens found (vacuously true when inactive).
    pub fn is_satisfied(&self) -> bool {
        self.found.len() == self.tokens.len()
    }

    /// Feed one text chunk; returns true once every token has been seen.
    pub fn feed(&mut self, chunk: &str) -> bool {
        if self.tokens.is_empty() || chunk.is_empty() || self.is_satisfied() {
            return self.is_satisfied() && self.is_active();
        }
        let lowered = chunk.to_lowercase();
        for (i, token) in self.tokens.iter().enumerate() {
            if !self.found.contains(&i) && lowered.contains(token) {
                self.found.insert(i);
            }
        }
        self.is_satisfied()
    }
}
