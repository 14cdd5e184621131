use serde::Serialize;
use serde_json::Value;

use crate::models::{CallExecutionRecord, ConversationPayload, Speaker};
use crate::models::record::value_as_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One chat-style message of a call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadableMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: Option<String>,
}

/// Rebuild a call as chat messages
///
/// Log events of any kind are grouped by `created_at` in first-seen order; each group
/// contributes its first user response and then its first agent response.
/// A payload that is already a list of `role`/`content` messages is passed
/// through. Other shapes give no messages.
pub fn readable_conversation(payload: Option<&ConversationPayload>) -> Vec<ReadableMessage> {
    match payload {
        Some(ConversationPayload::EventList(events)) => {
            let mut groups: Vec<(Option<&str>, Option<&str>, Option<&str>)> = Vec::new();

            for event in events {
                // Every event opens its timestamp's group, speech or not
                let timestamp = event.created_at.as_deref();
                let index = match groups.iter().position(|(ts, _, _)| *ts == timestamp) {
                    Some(i) => i,
                    None => {
                        groups.push((timestamp, None, None));
                        groups.len() - 1
                    }
                };
                let Some(speech) = event.speech() else {
                    continue;
                };
                let group = &mut groups[index];
                match event.speaker() {
                    Some(Speaker::User) => {
                        group.1.get_or_insert(speech);
                    }
                    Some(Speaker::Agent) => {
                        group.2.get_or_insert(speech);
                    }
                    None => {}
                }
            }

            groups
                .into_iter()
                .flat_map(|(timestamp, user, agent)| {
                    [(Role::User, user), (Role::Assistant, agent)]
                        .into_iter()
                        .filter_map(move |(role, content)| {
                            content.map(|c| ReadableMessage {
                                role,
                                content: c.to_string(),
                                timestamp: timestamp.map(str::to_string),
                            })
                        })
                })
                .collect()
        }
        Some(ConversationPayload::Unstructured(Value::Array(items))) => {
            items.iter().filter_map(message_from_value).collect()
        }
        _ => Vec::new(),
    }
}

fn message_from_value(item: &Value) -> Option<ReadableMessage> {
    let content = value_as_text(item.get("content")?)?;
    let role = match item.get("role").and_then(Value::as_str) {
        Some("assistant") | Some("agent") | Some("bot") => Role::Assistant,
        _ => Role::User,
    };
    Some(ReadableMessage {
        role,
        content,
        timestamp: item
            .get("timestamp")
            .or_else(|| item.get("created_at"))
            .and_then(value_as_text),
    })
}

/// Render a call's conversation for reading in a terminal
pub fn render_conversation(record: &CallExecutionRecord) -> String {
    let messages = readable_conversation(record.conversation.as_ref());

    if !messages.is_empty() {
        let mut output = String::new();
        for message in &messages {
            let speaker = match message.role {
                Role::User => "User",
                Role::Assistant => "Agent",
            };
            match &message.timestamp {
                Some(ts) => output.push_str(&format!("[{}] {}:\n", ts, speaker)),
                None => output.push_str(&format!("{}:\n", speaker)),
            }
            output.push_str(&message.content);
            output.push_str("\n\n");
        }
        return output;
    }

    match &record.transcript {
        Some(transcript) => format!("Full transcript:\n{}\n", transcript),
        None => "No conversation data available for this call\n".to_string(),
    }
}
