// Per-tool session sources
// Each source knows one tool's on-disk layout and record schema and yields
// normalized SessionRecords; everything above this crate is generic over
// the SessionSource trait.

pub mod claude;
pub mod codex;
mod error;
mod text;
mod traits;

pub use error::{Error, Result};
pub use text::{MessageContent, is_punctuation_only, is_separator_line, is_short_title};
pub use traits::{ProviderSet, SessionSource};
