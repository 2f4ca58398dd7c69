mod args;
mod handlers;
mod output;

pub use args::{Cli, Commands, IndexCommand};

use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index { command } => match command {
            IndexCommand::Build { tool, db, verbose } => {
                handlers::index::handle_build(tool, db.as_deref(), verbose)
            }
        },
        Commands::List {
            filter,
            tool,
            limit,
            use_index,
            db,
            json,
            detail,
        } => handlers::list::handle(
            &filter,
            tool,
            limit,
            use_index,
            db.as_deref(),
            json,
            detail,
        ),
    }
}
