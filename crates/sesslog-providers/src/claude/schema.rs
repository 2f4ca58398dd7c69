use serde::Deserialize;

use crate::text::MessageContent;

/// One line of a Claude Code session file (`~/.claude/projects/.../*.jsonl`).
///
/// Only user and assistant lines carry anything we index; every other line
/// type (summaries, file-history snapshots, hook output) falls into the
/// `Unknown` arm instead of failing the parse.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum ClaudeLine {
    User(ClaudeEnvelope),
    Assistant(ClaudeEnvelope),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ClaudeEnvelope {
    pub timestamp: Option<String>,
    pub message: ClaudeMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClaudeMessage {
    pub content: MessageContent,
    pub model: Option<String>,
}
