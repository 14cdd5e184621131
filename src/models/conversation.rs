use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::lenient_string;

/// Who produced a conversation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// Caller speech, as recognized by the transcriber
    User,
    /// Voice agent response generated by the LLM
    Agent,
}

/// A single entry of the provider's execution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEvent {
    /// Emitting component (`transcriber`, `llm`, `synthesizer`, ...)
    #[serde(default, deserialize_with = "lenient_string")]
    pub component: Option<String>,
    /// Event kind (`request`, `response`, ...)
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    /// Event text
    #[serde(default, deserialize_with = "lenient_string")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

impl ConversationEvent {
    /// Speaker of this event, if it is a spoken response at all
    pub fn speaker(&self) -> Option<Speaker> {
        if self.kind.as_deref() != Some("response") {
            return None;
        }
        match self.component.as_deref() {
            Some("transcriber") => Some(Speaker::User),
            Some("llm") => Some(Speaker::Agent),
            _ => None,
        }
    }

    /// Spoken text, present only for user and agent responses
    pub fn speech(&self) -> Option<&str> {
        self.speaker()?;
        self.data.as_deref()
    }
}

/// Conversation payload of a call, with its shape resolved up front
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConversationPayload {
    /// Ordered provider log events
    EventList(Vec<ConversationEvent>),
    /// A transcript already flattened to text
    PlainText(String),
    /// Anything else the provider sent
    Unstructured(Value),
}

impl ConversationPayload {
    /// Resolve a raw JSON payload; `null` and `""` mean no payload
    ///
    /// Event lists arrive either wrapped as `{"data": [...]}` or as a bare
    /// array whose entries all carry a `component` field.
    pub fn from_value(value: Value) -> Option<Self> {
        let events = match &value {
            Value::Null => return None,
            Value::String(text) if text.is_empty() => return None,
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(items)) => parse_events(items),
                _ => None,
            },
            Value::Array(items) if !items.is_empty() && items.iter().all(is_event) => {
                parse_events(items)
            }
            _ => None,
        };

        let payload = match (events, value) {
            (Some(events), _) => Self::EventList(events),
            (None, Value::String(text)) => Self::PlainText(text),
            (None, other) => Self::Unstructured(other),
        };
        Some(payload)
    }

    /// Events of an event-list payload; empty for every other shape
    pub fn events(&self) -> &[ConversationEvent] {
        match self {
            Self::EventList(events) => events,
            _ => &[],
        }
    }
}

fn is_event(item: &Value) -> bool {
    item.get("component").is_some()
}

fn parse_events(items: &[Value]) -> Option<Vec<ConversationEvent>> {
    items
        .iter()
        .map(|item| {
            if item.is_object() {
                serde_json::from_value(item.clone()).ok()
            } else {
                None
            }
        })
        .collect()
}
