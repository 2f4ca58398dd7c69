use anyhow::Result;
use sesslog_engine::{BulletSummarizer, CachedSummarizer, Config, query_index, scan_sessions};
use sesslog_providers::ProviderSet;
use sesslog_types::SessionRecord;
use std::path::Path;

use crate::args::{FilterArgs, ToolScope};
use crate::handlers::build_filter;
use crate::output;

pub fn handle(
    filter_args: &FilterArgs,
    tool: ToolScope,
    limit: Option<usize>,
    use_index: bool,
    db: Option<&Path>,
    json: bool,
    detail: bool,
) -> Result<()> {
    let filter = build_filter(filter_args)?;
    let config = Config::load()?;
    let providers = config.provider_set();

    // Unlimited when a filter narrows the result; otherwise a small default
    // so a bare `list` stays readable.
    let effective_limit = limit.or_else(|| {
        if filter.is_empty() {
            Some(config.display.default_limit.unwrap_or(match tool {
                ToolScope::All => 5,
                _ => 20,
            }))
        } else {
            None
        }
    });

    let (records, scan_errors) = if use_index {
        let db_path = config.resolve_db_path(db);
        let records = query_index(&db_path, &filter, tool.tool(), effective_limit)?;
        (records, 0)
    } else {
        let summarizer = CachedSummarizer::new(
            BulletSummarizer::new(),
            CachedSummarizer::<BulletSummarizer>::default_cache_dir(),
        );
        let outcome = scan_sessions(&providers, tool.tool(), &filter, effective_limit, &summarizer);
        (outcome.records, outcome.errors)
    };

    if json {
        output::print_json(&records, &providers)?;
    } else {
        print_grouped(&records, &providers, tool, detail);
    }

    if scan_errors > 0 {
        eprintln!("warning: {} session files could not be read", scan_errors);
    }
    Ok(())
}

fn print_grouped(
    records: &[SessionRecord],
    providers: &ProviderSet,
    scope: ToolScope,
    detail: bool,
) {
    output::print_totals(records, providers, scope);

    let mut index = 1usize;
    for source in providers.scoped(scope.tool()) {
        let tool_records: Vec<&SessionRecord> = records
            .iter()
            .filter(|record| record.tool == source.tool())
            .collect();

        output::print_tool_heading(source.display_name(), tool_records.len());
        for record in tool_records {
            output::print_session(record, providers, index, detail);
            index += 1;
        }
    }
}
