use crate::models::{CallExecutionRecord, ConversationPayload};

/// Where the normalized text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptSource {
    /// Joined user and agent responses from the event log
    EventList,
    /// Plain-text conversation payload
    PlainText,
    /// The record's fallback transcript string
    FallbackTranscript,
    /// JSON serialization of an unrecognized payload
    Serialized,
    /// Nothing to read
    Empty,
}

/// Flattened conversation text for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTranscript {
    pub text: String,
    pub source: TranscriptSource,
}

impl NormalizedTranscript {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Flatten a record's conversation into plain text
pub fn normalize(record: &CallExecutionRecord) -> NormalizedTranscript {
    normalize_payload(record.conversation.as_ref(), record.transcript.as_deref())
}

/// Flatten a conversation payload into plain text
///
/// Event lists keep user and agent responses in log order, joined by single
/// spaces; other events are dropped. Plain text is taken verbatim. Anything
/// else falls back to `transcript`, and only then to the payload's JSON.
pub fn normalize_payload(
    payload: Option<&ConversationPayload>,
    transcript: Option<&str>,
) -> NormalizedTranscript {
    match payload {
        Some(ConversationPayload::EventList(events)) => NormalizedTranscript {
            text: events
                .iter()
                .filter_map(|e| e.speech())
                .collect::<Vec<_>>()
                .join(" "),
            source: TranscriptSource::EventList,
        },
        Some(ConversationPayload::PlainText(text)) => NormalizedTranscript {
            text: text.clone(),
            source: TranscriptSource::PlainText,
        },
        Some(ConversationPayload::Unstructured(value)) => match transcript {
            Some(t) => fallback(t),
            None => NormalizedTranscript {
                text: serde_json::to_string(value).unwrap_or_default(),
                source: TranscriptSource::Serialized,
            },
        },
        None => match transcript {
            Some(t) => fallback(t),
            None => NormalizedTranscript {
                text: String::new(),
                source: TranscriptSource::Empty,
            },
        },
    }
}

fn fallback(transcript: &str) -> NormalizedTranscript {
    NormalizedTranscript {
        text: transcript.to_string(),
        source: TranscriptSource::FallbackTranscript,
    }
}
