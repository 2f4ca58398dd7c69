use anyhow::Result;
use sesslog_engine::{BulletSummarizer, CachedSummarizer, Config, IndexProgress, build_index};
use sesslog_types::QueryFilter;
use std::path::Path;

use crate::args::ToolScope;
use crate::output;

pub fn handle_build(tool: ToolScope, db: Option<&Path>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.resolve_db_path(db);
    let providers = config.provider_set();
    let summarizer = CachedSummarizer::new(
        BulletSummarizer::new(),
        CachedSummarizer::<BulletSummarizer>::default_cache_dir(),
    );

    let stats = build_index(
        &db_path,
        &providers,
        tool.tool(),
        &QueryFilter::default(),
        &summarizer,
        |progress| {
            if verbose {
                match progress {
                    IndexProgress::SourceScanning { tool } => {
                        println!("Scanning {}...", tool.display_name());
                    }
                    IndexProgress::SourceScanned { tool, sessions } => {
                        println!("  {} sessions from {}", sessions, tool.display_name());
                    }
                }
            }
        },
    )?;

    output::print_reconcile_stats(&stats, &db_path);
    Ok(())
}
