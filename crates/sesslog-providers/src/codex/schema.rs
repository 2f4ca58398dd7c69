use serde::Deserialize;

use crate::text::MessageContent;

/// One line of a Codex rollout file
/// (`~/.codex/sessions/<yyyy>/<mm>/<dd>/*.jsonl`).
///
/// `session_meta` opens the file and carries the session identity; the
/// conversation itself arrives as flat `message` lines with a role.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum CodexLine {
    SessionMeta(SessionMetaLine),
    Message(MessageLine),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SessionMetaLine {
    pub timestamp: Option<String>,
    pub payload: SessionMetaPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SessionMetaPayload {
    pub id: String,
    pub cwd: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MessageLine {
    pub role: String,
    pub content: MessageContent,
    pub timestamp: Option<String>,
    pub model: Option<String>,
}
