use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::io::{execution_list, records_from_values};
use crate::models::CallExecutionRecord;

use super::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.bolna.ai";

/// Configuration for the provider's execution log API
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key (from CALL_PROVIDER_API_KEY env var)
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Default agent whose executions are fetched
    pub agent_id: Option<String>,
}

impl ProviderConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("CALL_PROVIDER_API_KEY")
            .map_err(|_| ProviderError::MissingConfig("CALL_PROVIDER_API_KEY"))?;
        let base_url =
            std::env::var("CALL_PROVIDER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_id: std::env::var("CALL_PROVIDER_AGENT_ID").ok(),
        })
    }

    /// Create with custom settings
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_id: None,
        }
    }
}

/// Executions fetched for one agent
#[derive(Debug, Clone)]
pub struct FetchedExecutions {
    /// Parsed records, in provider order
    pub records: Vec<CallExecutionRecord>,
    /// Merged provider JSON, kept for download
    pub raw: Vec<Value>,
}

/// Client for the provider's execution log API
pub struct ExecutionsClient {
    client: Client,
    config: ProviderConfig,
}

impl ExecutionsClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn executions_url(&self, agent_id: &str) -> String {
        format!("{}/v2/agent/{}/executions", self.config.base_url, agent_id)
    }

    pub fn execution_log_url(&self, execution_id: &str) -> String {
        format!("{}/executions/{}/log", self.config.base_url, execution_id)
    }

    /// List the executions of an agent, as raw JSON objects
    pub async fn list_executions(&self, agent_id: &str) -> Result<Vec<Value>, ProviderError> {
        let url = self.executions_url(agent_id);
        let body = self.get_json(&url).await?;
        Ok(execution_list(body))
    }

    /// Fetch the detailed log of one execution
    pub async fn execution_log(&self, execution_id: &str) -> Result<Value, ProviderError> {
        self.get_json(&self.execution_log_url(execution_id)).await
    }

    /// Fetch every execution of an agent together with its detailed log
    ///
    /// A failed detail request keeps the listed execution as-is; only a
    /// failure of the listing itself is an error. Nothing is retried.
    pub async fn fetch_executions(&self, agent_id: &str) -> Result<FetchedExecutions, ProviderError> {
        let listed = self.list_executions(agent_id).await?;
        info!("Listed {} executions for agent {}", listed.len(), agent_id);

        let mut raw = Vec::with_capacity(listed.len());
        for execution in listed {
            let Some(execution_id) = execution_id_of(&execution) else {
                warn!("Execution without id, skipping detail fetch");
                raw.push(execution);
                continue;
            };

            match self.execution_log(&execution_id).await {
                Ok(detail) => {
                    debug!("Fetched log for execution {}", execution_id);
                    raw.push(merge_execution(execution, detail, &execution_id));
                }
                Err(e) => {
                    warn!("Failed to fetch log for execution {}: {}", execution_id, e);
                    raw.push(execution);
                }
            }
        }

        let records = records_from_values(raw.clone());
        Ok(FetchedExecutions { records, raw })
    }

    async fn get_json(&self, url: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        response.json().await.map_err(|source| ProviderError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Execution id of a listed execution (`execution_id`, else `id`)
pub fn execution_id_of(execution: &Value) -> Option<String> {
    ["execution_id", "id"].iter().find_map(|key| match execution.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Overlay a detailed log on its listed execution
///
/// Detail fields win, except that the execution id always stays the one
/// the execution was listed under.
pub fn merge_execution(listed: Value, detail: Value, execution_id: &str) -> Value {
    let mut merged = match listed {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(detail) = detail {
        merged.extend(detail);
    }
    merged.insert(
        "execution_id".to_string(),
        Value::String(execution_id.to_string()),
    );
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let client = ExecutionsClient::new(ProviderConfig::new(
            "key".to_string(),
            "https://example.test/".to_string(),
        ));

        assert_eq!(
            client.executions_url("agent-9"),
            "https://example.test/v2/agent/agent-9/executions"
        );
        assert_eq!(
            client.execution_log_url("exec-1"),
            "https://example.test/executions/exec-1/log"
        );
    }

    #[test]
    fn test_execution_id_of() {
        assert_eq!(execution_id_of(&json!({"execution_id": "a", "id": "b"})).as_deref(), Some("a"));
        assert_eq!(execution_id_of(&json!({"execution_id": "", "id": "b"})).as_deref(), Some("b"));
        assert_eq!(execution_id_of(&json!({"id": 17})).as_deref(), Some("17"));
        assert_eq!(execution_id_of(&json!({"status": "completed"})), None);
    }

    #[test]
    fn test_merge_detail_over_listing() {
        let listed = json!({"id": "a", "status": "in_progress", "duration": 10});
        let detail = json!({
            "execution_id": "other",
            "status": "completed",
            "conversation": {"data": []}
        });

        let merged = merge_execution(listed, detail, "a");

        assert_eq!(merged["execution_id"], "a");
        assert_eq!(merged["status"], "completed");
        assert_eq!(merged["duration"], 10);
        assert!(merged["conversation"]["data"].is_array());
    }

    #[test]
    fn test_merge_with_non_object_detail() {
        let merged = merge_execution(json!({"id": "a", "status": "failed"}), json!("oops"), "a");

        assert_eq!(merged["status"], "failed");
        assert_eq!(merged["execution_id"], "a");
    }
}
