pub mod config;
pub mod index_ops;
pub mod scan;
pub mod summarize;

pub use config::Config;
pub use index_ops::{IndexProgress, build_index, query_index};
pub use scan::{ScanOutcome, scan_sessions};
pub use summarize::{BulletSummarizer, CachedSummarizer, Summarizer};
