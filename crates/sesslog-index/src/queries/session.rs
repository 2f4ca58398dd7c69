use rusqlite::Connection;
use sesslog_types::{QueryFilter, SessionRecord, Tool, from_store_timestamp, fts_match_expr, to_store_timestamp};
use std::path::PathBuf;

use crate::{Error, Result};

/// Translate a `QueryFilter` into store predicates and read matching
/// sessions, newest activity first.
///
/// Clause mapping mirrors the streaming predicate engine: FTS MATCH over
/// the stored search document for tokens, LIKE containment for the project
/// substring, inclusive string-range comparison on the canonical start
/// timestamp, equality on the tool key. The limit truncates after ordering.
pub fn query(
    conn: &Connection,
    filter: &QueryFilter,
    tool: Option<Tool>,
    limit: Option<usize>,
) -> Result<Vec<SessionRecord>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let mut join_fts = false;

    if let Some(match_expr) = fts_match_expr(&filter.search) {
        join_fts = true;
        clauses.push("sessions_fts MATCH ?".to_string());
        params.push(Box::new(match_expr));
    }

    if filter.has_project() {
        clauses.push("s.project_path LIKE ?".to_string());
        params.push(Box::new(format!("%{}%", filter.project.trim())));
    }

    if let Some(since) = filter.since {
        clauses.push("s.start_time >= ?".to_string());
        params.push(Box::new(to_store_timestamp(since)));
    }
    if let Some(until) = filter.until {
        clauses.push("s.start_time <= ?".to_string());
        params.push(Box::new(to_store_timestamp(until)));
    }

    if let Some(tool) = tool {
        clauses.push("s.tool = ?".to_string());
        params.push(Box::new(tool.key().to_string()));
    }

    let join_clause = if join_fts {
        "JOIN sessions_fts ON sessions_fts.rowid = s.id"
    } else {
        ""
    };
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let limit_clause = match limit {
        Some(limit) => {
            params.push(Box::new(limit as i64));
            "LIMIT ?"
        }
        None => "",
    };

    let sql = format!(
        r#"
        SELECT s.tool, s.session_id, s.project_path, s.start_time, s.last_time,
               s.message_count, s.first_message, s.summary, s.model, s.file_path,
               s.file_size, s.mtime
        FROM sessions s
        {}
        {}
        ORDER BY COALESCE(s.last_time, s.start_time) DESC
        {}
        "#,
        join_clause, where_clause, limit_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok(RawRow {
            tool: row.get(0)?,
            session_id: row.get(1)?,
            project_path: row.get::<_, Option<String>>(2)?,
            start_time: row.get::<_, Option<String>>(3)?,
            last_time: row.get::<_, Option<String>>(4)?,
            message_count: row.get::<_, Option<i64>>(5)?,
            first_message: row.get::<_, Option<String>>(6)?,
            summary: row.get::<_, Option<String>>(7)?,
            model: row.get::<_, Option<String>>(8)?,
            file_path: row.get(9)?,
            file_size: row.get::<_, Option<i64>>(10)?,
            mtime: row.get::<_, Option<i64>>(11)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

struct RawRow {
    tool: String,
    session_id: String,
    project_path: Option<String>,
    start_time: Option<String>,
    last_time: Option<String>,
    message_count: Option<i64>,
    first_message: Option<String>,
    summary: Option<String>,
    model: Option<String>,
    file_path: String,
    file_size: Option<i64>,
    mtime: Option<i64>,
}

impl RawRow {
    fn into_record(self) -> Result<SessionRecord> {
        let tool: Tool = self
            .tool
            .parse()
            .map_err(|_| Error::Query(format!("corrupt tool discriminator '{}'", self.tool)))?;

        Ok(SessionRecord {
            tool,
            session_id: self.session_id,
            source_path: PathBuf::from(self.file_path),
            project_path: self.project_path.unwrap_or_default(),
            start_time: self.start_time.as_deref().and_then(from_store_timestamp),
            last_activity: self.last_time.as_deref().and_then(from_store_timestamp),
            message_count: self.message_count.unwrap_or_default().max(0) as usize,
            first_message: self.first_message.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            file_size: self.file_size.unwrap_or_default().max(0) as u64,
            modified_at: self.mtime.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            user_messages: Vec::new(),
        })
    }
}
