use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::ConversationPayload;

/// Lifecycle status of a call execution as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    #[default]
    Unknown,
}

impl CallStatus {
    /// Map a provider status string onto the known set; anything else is `Unknown`
    pub fn from_provider(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => Self::from_provider(&s),
            _ => Self::Unknown,
        })
    }
}

/// One call execution as retrieved from the provider's log API
///
/// Deserialization never rejects an object: missing or oddly-typed fields
/// simply come through as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExecution")]
pub struct CallExecutionRecord {
    /// Execution identifier (empty when the provider omitted it)
    pub id: String,
    /// Recipient phone number
    pub phone_number: Option<String>,
    pub status: CallStatus,
    /// ISO-8601 creation timestamp, kept verbatim
    pub created_at: Option<String>,
    /// Call duration in seconds (finite and non-negative when present)
    pub duration_seconds: Option<f64>,
    /// Conversation payload, resolved once into its shape
    pub conversation: Option<ConversationPayload>,
    /// Plain transcript used when the conversation payload is not usable
    pub transcript: Option<String>,
}

impl CallExecutionRecord {
    pub fn is_completed(&self) -> bool {
        self.status == CallStatus::Completed
    }

    /// Creation time in UTC, if the timestamp parses
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        // The provider sometimes omits the offset
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Wire shape accepted for a record: provider fields plus our own serialized names
#[derive(Debug, Deserialize)]
struct RawExecution {
    #[serde(default, deserialize_with = "lenient_string")]
    execution_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    recipient_phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    phone_number: Option<String>,
    #[serde(default)]
    status: CallStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    duration_seconds: Option<f64>,
    #[serde(default)]
    conversation: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    transcript: Option<String>,
}

impl From<RawExecution> for CallExecutionRecord {
    fn from(raw: RawExecution) -> Self {
        Self {
            id: raw.execution_id.or(raw.id).unwrap_or_default(),
            phone_number: raw.recipient_phone_number.or(raw.phone_number),
            status: raw.status,
            created_at: raw.created_at,
            duration_seconds: raw.duration_seconds.or(raw.duration),
            conversation: raw.conversation.and_then(ConversationPayload::from_value),
            transcript: raw.transcript.filter(|t| !t.is_empty()),
        }
    }
}

/// Render a scalar JSON value as text; objects, arrays and null give `None`
pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_text))
}

fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let seconds = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(seconds.filter(|s| s.is_finite() && *s >= 0.0))
}
