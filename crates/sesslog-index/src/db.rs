use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use sesslog_types::{QueryFilter, SessionRecord, Tool, to_store_timestamp};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::Result;
use crate::queries;
use crate::schema::init_schema;

/// Counters from one reconcile run. `indexed + skipped + errors == scanned`;
/// callers compare these to detect silent data loss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub scanned: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub removed: usize,
    pub errors: usize,
}

/// Where the indexer gets the flattened search text for a changed file.
/// Implemented above this crate by the provider registry; failures are
/// per-file and non-fatal.
pub trait SearchTextSource {
    fn search_text(&self, tool: Tool, path: &Path) -> anyhow::Result<String>;
}

struct ExistingEntry {
    rowid: i64,
    file_size: i64,
    mtime: i64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self { conn };
        init_schema(&db.conn)?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        init_schema(&db.conn)?;
        Ok(db)
    }

    /// Synchronize the store with one filesystem snapshot.
    ///
    /// Unchanged files (same size and mtime) are skipped, changed or new
    /// ones are upserted together with a fresh search document, and entries
    /// whose backing file was not seen this run are deleted. The whole run
    /// is one transaction: a storage failure rolls everything back and
    /// propagates, while per-file failures (vanished file, text extraction)
    /// only bump the error counter.
    pub fn reconcile(
        &mut self,
        scanned: &[SessionRecord],
        texts: &dyn SearchTextSource,
    ) -> Result<ReconcileStats> {
        let mut stats = ReconcileStats {
            scanned: scanned.len(),
            ..Default::default()
        };

        let tx = self.conn.transaction()?;
        let existing = load_existing(&tx)?;
        let mut seen_paths: HashSet<String> = HashSet::new();

        for record in scanned {
            let path_key = record.source_path.to_string_lossy().into_owned();
            if path_key.is_empty() {
                stats.errors += 1;
                continue;
            }
            seen_paths.insert(path_key.clone());

            // Re-stat at index time; the scan's numbers may already be stale.
            let metadata = match std::fs::metadata(&record.source_path) {
                Ok(metadata) => metadata,
                Err(_) => {
                    stats.errors += 1;
                    continue;
                }
            };
            let current_size = metadata.len() as i64;
            let current_mtime = metadata
                .modified()
                .ok()
                .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
                .map(|duration| duration.as_secs() as i64)
                .unwrap_or(record.modified_at);

            let existing_entry = existing.get(&path_key);
            if let Some(entry) = existing_entry
                && entry.file_size == current_size
                && entry.mtime == current_mtime
            {
                stats.skipped += 1;
                continue;
            }

            let search_text = match texts.search_text(record.tool, &record.source_path) {
                Ok(text) => text,
                Err(_) => {
                    stats.errors += 1;
                    continue;
                }
            };

            let rowid = upsert_session(
                &tx,
                record,
                &path_key,
                current_size,
                current_mtime,
                existing_entry.map(|entry| entry.rowid),
            )?;

            // The search structure is replace-only: drop the old document
            // and write a fresh one under the same rowid.
            tx.execute(
                "DELETE FROM sessions_fts WHERE rowid = ?1",
                params![rowid],
            )?;
            tx.execute(
                r#"
                INSERT INTO sessions_fts (rowid, content, project_path, session_id, tool)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    rowid,
                    search_text,
                    record.project_path,
                    record.session_id,
                    record.tool.key()
                ],
            )?;
            stats.indexed += 1;
        }

        // Prune entries whose backing file disappeared or was renamed.
        for (path, entry) in &existing {
            if !seen_paths.contains(path) {
                tx.execute("DELETE FROM sessions WHERE id = ?1", params![entry.rowid])?;
                tx.execute(
                    "DELETE FROM sessions_fts WHERE rowid = ?1",
                    params![entry.rowid],
                )?;
                stats.removed += 1;
            }
        }

        tx.commit()?;
        Ok(stats)
    }

    /// Filtered, sorted, limited read over the store. See `queries::session`.
    pub fn query(
        &self,
        filter: &QueryFilter,
        tool: Option<Tool>,
        limit: Option<usize>,
    ) -> Result<Vec<SessionRecord>> {
        queries::session::query(&self.conn, filter, tool, limit)
    }

    pub fn session_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn load_existing(tx: &Transaction<'_>) -> Result<HashMap<String, ExistingEntry>> {
    let mut stmt = tx.prepare("SELECT id, file_path, file_size, mtime FROM sessions")?;
    let mut existing = HashMap::new();
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, Option<i64>>(3)?,
        ))
    })?;
    for row in rows {
        let (rowid, file_path, file_size, mtime) = row?;
        existing.insert(
            file_path,
            ExistingEntry {
                rowid,
                file_size: file_size.unwrap_or(-1),
                mtime: mtime.unwrap_or(-1),
            },
        );
    }
    Ok(existing)
}

fn upsert_session(
    tx: &Transaction<'_>,
    record: &SessionRecord,
    path_key: &str,
    file_size: i64,
    mtime: i64,
    existing_rowid: Option<i64>,
) -> Result<i64> {
    let start_time = record.start_time.map(to_store_timestamp);
    let last_time = record.last_activity.map(to_store_timestamp);

    match existing_rowid {
        Some(rowid) => {
            tx.execute(
                r#"
                UPDATE sessions
                SET tool = ?1, session_id = ?2, project_path = ?3, start_time = ?4,
                    last_time = ?5, message_count = ?6, first_message = ?7, summary = ?8,
                    model = ?9, file_path = ?10, file_size = ?11, mtime = ?12
                WHERE id = ?13
                "#,
                params![
                    record.tool.key(),
                    record.session_id,
                    record.project_path,
                    start_time,
                    last_time,
                    record.message_count as i64,
                    record.first_message,
                    record.summary,
                    record.model,
                    path_key,
                    file_size,
                    mtime,
                    rowid
                ],
            )?;
            Ok(rowid)
        }
        None => {
            tx.execute(
                r#"
                INSERT INTO sessions (
                    tool, session_id, project_path, start_time, last_time, message_count,
                    first_message, summary, model, file_path, file_size, mtime
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    record.tool.key(),
                    record.session_id,
                    record.project_path,
                    start_time,
                    last_time,
                    record.message_count as i64,
                    record.first_message,
                    record.summary,
                    record.model,
                    path_key,
                    file_size,
                    mtime
                ],
            )?;
            Ok(tx.last_insert_rowid())
        }
    }
}

impl Database {
    /// Linkage invariant: every session row has exactly one FTS document
    /// under the same rowid, and no document outlives its row.
    pub fn verify_search_linkage(&self) -> Result<bool> {
        let orphaned_rows: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM sessions s
            WHERE NOT EXISTS (SELECT 1 FROM sessions_fts f WHERE f.rowid = s.id)
            "#,
            [],
            |row| row.get(0),
        )?;
        let orphaned_docs: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM sessions_fts f
            WHERE NOT EXISTS (SELECT 1 FROM sessions s WHERE s.id = f.rowid)
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(orphaned_rows == 0 && orphaned_docs == 0)
    }
}
