use anyhow::{Context, Result};
use sesslog_index::{Database, ReconcileStats, SearchTextSource};
use sesslog_providers::ProviderSet;
use sesslog_types::{QueryFilter, SessionRecord, Tool};
use std::path::Path;

use crate::scan::scan_sessions;
use crate::summarize::Summarizer;

/// Progress events emitted while building the index.
#[derive(Debug, Clone)]
pub enum IndexProgress {
    SourceScanning { tool: Tool },
    SourceScanned { tool: Tool, sessions: usize },
}

/// Adapter handing the indexer a search document through the provider
/// registry, keeping sesslog-index free of a providers dependency.
struct ProviderTexts<'a>(&'a ProviderSet);

impl SearchTextSource for ProviderTexts<'_> {
    fn search_text(&self, tool: Tool, path: &Path) -> anyhow::Result<String> {
        Ok(self.0.search_text(tool, path)?)
    }
}

/// Build or refresh the index: scan every in-scope source, then reconcile
/// the snapshot against the store in one transaction.
///
/// Scan-level parse failures are folded into the returned error counter;
/// storage failures abort with no partial commit.
pub fn build_index<F>(
    db_path: &Path,
    providers: &ProviderSet,
    tool: Option<Tool>,
    filter: &QueryFilter,
    summarizer: &dyn Summarizer,
    mut on_progress: F,
) -> Result<ReconcileStats>
where
    F: FnMut(IndexProgress),
{
    let mut scanned = Vec::new();
    let mut scan_errors = 0usize;

    for source in providers.scoped(tool) {
        on_progress(IndexProgress::SourceScanning {
            tool: source.tool(),
        });
        let outcome = scan_sessions(
            providers,
            Some(source.tool()),
            filter,
            None,
            summarizer,
        );
        on_progress(IndexProgress::SourceScanned {
            tool: source.tool(),
            sessions: outcome.records.len(),
        });
        scan_errors += outcome.errors;
        scanned.extend(outcome.records);
    }

    let mut db = Database::open(db_path)
        .with_context(|| format!("Failed to open index at {}", db_path.display()))?;
    let mut stats = db
        .reconcile(&scanned, &ProviderTexts(providers))
        .context("Index reconcile failed")?;
    stats.errors += scan_errors;
    Ok(stats)
}

/// Answer a filter from the persisted store. A store that was never built
/// yields an empty result set, not an error.
pub fn query_index(
    db_path: &Path,
    filter: &QueryFilter,
    tool: Option<Tool>,
    limit: Option<usize>,
) -> Result<Vec<SessionRecord>> {
    if !db_path.exists() {
        return Ok(Vec::new());
    }
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open index at {}", db_path.display()))?;
    Ok(db.query(filter, tool, limit)?)
}
