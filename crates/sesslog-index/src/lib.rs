// SQLite session index
// One structured row per session plus an FTS5 search document under the
// same rowid; the two are only ever written inside one transaction.

mod db;
mod error;
mod queries;
mod schema;

pub use db::{Database, ReconcileStats, SearchTextSource};
pub use error::{Error, Result};
