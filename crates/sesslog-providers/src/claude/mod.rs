mod schema;
mod source;

pub use source::ClaudeSource;
