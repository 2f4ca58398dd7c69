use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sesslog_index::ReconcileStats;
use sesslog_providers::ProviderSet;
use sesslog_types::{SessionRecord, format_local};
use std::path::Path;

use crate::args::ToolScope;

fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

pub fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / 1024.0 / 1024.0)
    }
}

fn truncate_title(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

pub fn print_totals(records: &[SessionRecord], providers: &ProviderSet, scope: ToolScope) {
    let total_messages: usize = records.iter().map(|record| record.message_count).sum();
    let heading = format!(
        "{} sessions, {} messages",
        records.len(),
        total_messages
    );
    if use_color() {
        println!("{}", heading.bold());
    } else {
        println!("{}", heading);
    }

    for source in providers.scoped(scope.tool()) {
        let count = records
            .iter()
            .filter(|record| record.tool == source.tool())
            .count();
        println!("  {}: {}", source.display_name(), count);
    }
}

pub fn print_tool_heading(name: &str, count: usize) {
    println!();
    let line = format!("── {} ({}) ──", name, count);
    if use_color() {
        println!("{}", line.cyan());
    } else {
        println!("{}", line);
    }
}

pub fn print_session(
    record: &SessionRecord,
    providers: &ProviderSet,
    index: usize,
    detail: bool,
) {
    let title = if record.first_message.is_empty() {
        "(untitled)".to_string()
    } else {
        truncate_title(&record.first_message, 60)
    };

    println!();
    if use_color() {
        println!("[{}] {}", index, title.bold());
    } else {
        println!("[{}] {}", index, title);
    }
    println!(
        "    {} | {} messages | {}",
        format_local(record.activity_key()),
        record.message_count,
        format_size(record.file_size)
    );

    let project = if record.project_path.is_empty() {
        "(no project)"
    } else {
        &record.project_path
    };
    println!("    project: {}", project);

    if !record.model.is_empty() {
        println!("    model: {}", record.model);
    }
    if !record.summary.is_empty() {
        for line in record.summary.lines() {
            println!("    {}", line);
        }
    }

    let resume = providers.resume_command(record);
    if !resume.is_empty() {
        if use_color() {
            println!("    resume: {}", resume.green());
        } else {
            println!("    resume: {}", resume);
        }
    }

    if detail {
        println!("    file: {}", record.source_path.display());
        for (i, message) in record.user_messages.iter().enumerate() {
            println!("    [{}] {}", i + 1, truncate_title(message.trim(), 200));
        }
    }
}

pub fn print_reconcile_stats(stats: &ReconcileStats, db_path: &Path) {
    let heading = "Index updated";
    if use_color() {
        println!("{}", heading.bold());
    } else {
        println!("{}", heading);
    }
    println!("  scanned: {}", stats.scanned);
    println!("  indexed: {}", stats.indexed);
    println!("  skipped: {}", stats.skipped);
    println!("  removed: {}", stats.removed);
    println!("  errors:  {}", stats.errors);
    println!("  path:    {}", db_path.display());
}

pub fn print_json(records: &[SessionRecord], providers: &ProviderSet) -> anyhow::Result<()> {
    let payload: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            serde_json::json!({
                "tool": record.tool.key(),
                "session_id": record.session_id,
                "project_path": record.project_path,
                "start_time": record.start_time.map(|t| t.to_string()),
                "last_activity": record.last_activity.map(|t| t.to_string()),
                "message_count": record.message_count,
                "first_message": record.first_message,
                "summary": record.summary,
                "file_path": record.source_path,
                "file_size": record.file_size,
                "model": record.model,
                "resume_command": providers.resume_command(record),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
