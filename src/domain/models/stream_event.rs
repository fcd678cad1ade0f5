use serde::{Deserialize, Serialize};

/// Maximum number of characters carried in the `summary` of a `done` event.
pub const SUMMARY_MAX_CHARS: usize = 500;

/// One frame of a streamed research chat.
///
/// A stream is any number of `Text` events followed by exactly one terminal
/// `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Text {
        content: String,
    },
    Done {
        content: String,
        summary: String,
        document: String,
    },
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn text(content: impl Into<String>) -> Self {
        StreamEvent::Text {
            content: content.into(),
        }
    }

    /// Terminal event for a completed stream; `accumulated` is the full reply.
    pub fn done(accumulated: String) -> Self {
        let summary = truncate_chars(&accumulated, SUMMARY_MAX_CHARS);
        StreamEvent::Done {
            summary,
            document: accumulated.clone(),
            content: accumulated,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Text { .. })
    }
}

/// First `max` Unicode scalar values of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
