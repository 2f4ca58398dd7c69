use serde::Deserialize;
use serde_json::Value;

/// Message content as the tools write it: either a plain string or an array
/// of content blocks of which only `{"type": "text"}` carries searchable
/// text. Anything else deserializes without failing the whole line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Block {
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    },
    Text(String),
    Other(Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Flatten to plain text: text blocks and bare strings joined with a
    /// space, trimmed. Tool-use blocks, images and the like contribute
    /// nothing.
    pub fn plain_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.trim().to_string(),
            MessageContent::Parts(parts) => {
                let mut pieces = Vec::new();
                for part in parts {
                    match part {
                        ContentPart::Block { kind, text: Some(text) } if kind == "text" => {
                            pieces.push(text.as_str());
                        }
                        ContentPart::Text(text) => pieces.push(text.as_str()),
                        _ => {}
                    }
                }
                pieces.join(" ").trim().to_string()
            }
            MessageContent::Other(_) => String::new(),
        }
    }
}

/// Count characters that carry meaning for titles: not whitespace, not
/// punctuation or symbols.
fn significant_chars(text: &str) -> usize {
    text.chars()
        .filter(|ch| !ch.is_whitespace() && ch.is_alphanumeric())
        .count()
}

/// True when the trimmed text consists solely of punctuation or symbols.
pub fn is_punctuation_only(text: &str) -> bool {
    let stripped = text.trim();
    if stripped.is_empty() {
        return false;
    }
    significant_chars(stripped) == 0
}

/// True for horizontal-rule lines users sometimes paste ("----", "====").
pub fn is_separator_line(text: &str) -> bool {
    let stripped = text.trim();
    if stripped.is_empty() {
        return false;
    }
    stripped.chars().all(|ch| "─=━-_—".contains(ch))
}

/// True when the text is too short to serve as a session title.
pub fn is_short_title(text: &str) -> bool {
    const MIN_LENGTH: usize = 3;
    significant_chars(text) < MIN_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_from_string() {
        let content: MessageContent = serde_json::from_str("\"  hello world \"").unwrap();
        assert_eq!(content.plain_text(), "hello world");
    }

    #[test]
    fn test_plain_text_from_blocks() {
        let json = r#"[
            {"type": "text", "text": "first"},
            {"type": "tool_use", "name": "Bash", "input": {}},
            "bare string",
            {"type": "text", "text": "second"}
        ]"#;
        let content: MessageContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.plain_text(), "first bare string second");
    }

    #[test]
    fn test_plain_text_from_unexpected_shape() {
        let content: MessageContent = serde_json::from_str("{\"weird\": true}").unwrap();
        assert_eq!(content.plain_text(), "");
    }

    #[test]
    fn test_separator_and_punctuation_detection() {
        assert!(is_separator_line("--------"));
        assert!(is_separator_line("===="));
        assert!(is_separator_line("—————"));
        assert!(!is_separator_line("-- notes --"));
        assert!(is_punctuation_only("?!…"));
        assert!(!is_punctuation_only("ok?"));
        assert!(!is_punctuation_only(""));
    }

    #[test]
    fn test_short_title() {
        assert!(is_short_title(""));
        assert!(is_short_title("ok"));
        assert!(is_short_title("? !"));
        assert!(!is_short_title("fix the bug"));
        // CJK characters count as significant
        assert!(!is_short_title("修复这个问题"));
    }
}
