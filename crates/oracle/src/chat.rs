//! OpenAI-compatible chat-completions client used as the decision oracle.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use perp_agent_core::{DecisionOracle, OracleConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends the trader persona plus the cycle prompt and returns the reply text.
pub struct ChatOracle {
    config: OracleConfig,
    http: Client,
}

impl ChatOracle {
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: OracleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, http })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !self.config.instructions.trim().is_empty() {
            messages.push(ChatMessage::new("system", self.config.instructions.clone()));
        }
        messages.push(ChatMessage::new("user", prompt));

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl DecisionOracle for ChatOracle {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.config.model, "Sending prompt to oracle");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .context("Oracle request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Oracle API error: {} - {}", status, body);
            return Err(anyhow!("Oracle API error: {status} - {body}"));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse oracle response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Oracle returned no message content"))?;

        debug!("Oracle response received: {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn config(base_url: String) -> OracleConfig {
        OracleConfig {
            model: "gpt-4o-mini".to_string(),
            api_key: "sk-test".to_string(),
            base_url,
            ..OracleConfig::default()
        }
    }

    #[test]
    fn request_puts_persona_before_prompt() {
        let oracle = ChatOracle::new(config("http://localhost".to_string())).unwrap();
        let request = oracle.request("price is 65000");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "price is 65000");
        assert!(request.temperature.is_none());
    }

    #[test]
    fn empty_instructions_send_only_the_prompt() {
        let mut cfg = config("http://localhost".to_string());
        cfg.instructions = String::new();
        let oracle = ChatOracle::new(cfg).unwrap();
        assert_eq!(oracle.request("hi").messages.len(), 1);
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"action\":\"HOLD\",\"confidence\":10}"},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let oracle = ChatOracle::new(config(server.uri())).unwrap();
        let text = oracle.invoke("snapshot").await.unwrap();
        assert_eq!(text, "{\"action\":\"HOLD\",\"confidence\":10}");

        let received: Vec<Request> = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][1]["content"], "snapshot");
    }

    #[tokio::test]
    async fn api_error_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let oracle = ChatOracle::new(config(server.uri())).unwrap();
        let err = oracle.invoke("snapshot").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let oracle = ChatOracle::new(config(server.uri())).unwrap();
        assert!(oracle.invoke("snapshot").await.is_err());
    }
}
