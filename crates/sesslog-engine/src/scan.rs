use sesslog_providers::ProviderSet;
use sesslog_types::{QueryFilter, SessionRecord, Tool, sort_newest_first};

use crate::summarize::Summarizer;

/// Result of one streaming scan: accepted records plus the count of files
/// that failed to parse or read. Parse failures never abort a scan; the
/// count is surfaced so callers can tell "no matches" from "couldn't look".
pub struct ScanOutcome {
    pub records: Vec<SessionRecord>,
    pub errors: usize,
}

/// Streaming fallback: answer a filter directly from the source files,
/// without a persisted store.
///
/// Each candidate file is parsed exactly once; the sources apply the
/// structured predicates as soon as the fields are known and run the token
/// matcher incrementally, so non-matching files are dropped early. Per-tool
/// results are ordered newest-first and truncated to `per_source_limit`
/// before the combined list is ordered again, mirroring how the indexed
/// query orders and limits.
pub fn scan_sessions(
    providers: &ProviderSet,
    tool: Option<Tool>,
    filter: &QueryFilter,
    per_source_limit: Option<usize>,
    summarizer: &dyn Summarizer,
) -> ScanOutcome {
    let mut all_records = Vec::new();
    let mut errors = 0usize;

    for source in providers.scoped(tool) {
        let mut source_records = Vec::new();
        for path in source.list_candidate_files() {
            match source.parse_session(&path, Some(filter)) {
                Ok(Some(mut record)) => {
                    record.summary = summarizer.summarize(&record.user_messages);
                    source_records.push(record);
                }
                Ok(None) => {}
                Err(_) => errors += 1,
            }
        }

        sort_newest_first(&mut source_records);
        if let Some(limit) = per_source_limit {
            source_records.truncate(limit);
        }
        all_records.extend(source_records);
    }

    sort_newest_first(&mut all_records);
    ScanOutcome {
        records: all_records,
        errors,
    }
}
