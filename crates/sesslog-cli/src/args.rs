use clap::{Args, Parser, Subcommand, ValueEnum};
use sesslog_types::Tool;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sesslog",
    about = "Index and search local AI-assistant session logs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Manage the session index")]
    Index {
        #[command(subcommand)]
        command: IndexCommand,
    },

    #[command(about = "List sessions, streaming by default or from the index")]
    List {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value = "all", help = "Restrict to one tool")]
        tool: ToolScope,

        #[arg(long, help = "Maximum sessions to show (default: unlimited when filtering)")]
        limit: Option<usize>,

        #[arg(long, help = "Answer from the persisted index instead of re-parsing")]
        use_index: bool,

        #[arg(long, value_name = "PATH", help = "Index database path")]
        db: Option<PathBuf>,

        #[arg(long, help = "Emit JSON instead of formatted text")]
        json: bool,

        #[arg(long, help = "Show file paths and per-session user messages")]
        detail: bool,
    },
}

#[derive(Subcommand)]
pub enum IndexCommand {
    #[command(about = "Scan all sources and incrementally update the index")]
    Build {
        #[arg(long, default_value = "all", help = "Restrict to one tool")]
        tool: ToolScope,

        #[arg(long, value_name = "PATH", help = "Index database path")]
        db: Option<PathBuf>,

        #[arg(long, help = "Report each source as it is scanned")]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long, help = "Search words; every word must appear in the session text")]
    pub search: Option<String>,

    #[arg(long, help = "Project path substring (case-insensitive)")]
    pub project: Option<String>,

    #[arg(long, value_name = "DATE", help = "Sessions started on or after (YYYY-MM-DD[ HH:MM])")]
    pub since: Option<String>,

    #[arg(long, value_name = "DATE", help = "Sessions started on or before (YYYY-MM-DD[ HH:MM])")]
    pub until: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolScope {
    All,
    Claude,
    Codex,
}

impl ToolScope {
    /// `None` means every tool is in scope.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            ToolScope::All => None,
            ToolScope::Claude => Some(Tool::Claude),
            ToolScope::Codex => Some(Tool::Codex),
        }
    }
}
