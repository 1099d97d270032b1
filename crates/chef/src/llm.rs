use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to language model failed: {0}")]
    Request(String),

    #[error("language model returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse language model response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling settings forwarded to the model server
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    /// Cap on newly generated tokens
    pub num_predict: u32,
    /// Context window; longer prompts are truncated by the server
    pub num_ctx: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.2,
            num_predict: 1000,
            num_ctx: 2048,
        }
    }
}

/// A chat-style text generator.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    options: GenerationOptions,
    json_mode: bool,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: GenerationOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerationOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            options: GenerationOptions::default(),
            json_mode: false,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Ask the server to constrain output to JSON
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(self)
    }

    fn format(&self) -> Option<&'static str> {
        self.json_mode.then_some("json")
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, LlmError> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: self.options,
            format: self.format(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = read_success_body(response).await?;
        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(Some(chat.message.content))
    }

    /// Single-prompt endpoint, used when the server has no chat endpoint.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);

        let system = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str());
        let prompt = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: self.options,
            format: self.format(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let body = read_success_body(response).await?;
        let generated: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(generated.response)
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        debug!(model = %self.model, messages = messages.len(), "Sending chat request");

        match self.chat(messages).await? {
            Some(content) => Ok(content),
            None => {
                warn!(model = %self.model, "Chat endpoint unavailable, using direct prompt");
                self.generate(messages).await
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be a chef"), ChatMessage::user("eggs please")]
    }

    #[tokio::test]
    async fn test_chat_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "stream": false,
                "options": { "num_predict": 1000, "num_ctx": 2048 },
                "messages": [
                    { "role": "system", "content": "be a chef" },
                    { "role": "user", "content": "eggs please" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "{\"title\": \"Omelette\"}"}, "done": true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "test-model".to_string());
        let reply = client.complete(&messages()).await.unwrap();

        assert_eq!(reply, r#"{"title": "Omelette"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_custom_options_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "options": { "num_predict": 400, "num_ctx": 4096 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "{}"}, "done": true}"#)
            .create_async()
            .await;

        let options = GenerationOptions {
            num_predict: 400,
            num_ctx: 4096,
            ..GenerationOptions::default()
        };
        let client = OllamaClient::new(server.url(), "m".to_string()).with_options(options);
        client.complete(&messages()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_json_mode_sets_format() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({ "format": "json" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "{}"}, "done": true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "m".to_string()).with_json_mode(true);
        client.complete(&messages()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_generate() {
        let mut server = mockito::Server::new_async().await;
        let chat = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .create_async()
            .await;
        let generate = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "system": "be a chef",
                "prompt": "eggs please"
            })))
            .with_status(200)
            .with_body(r#"{"response": "plain reply", "done": true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "m".to_string());
        let reply = client.complete(&messages()).await.unwrap();

        assert_eq!(reply, "plain reply");
        chat.assert_async().await;
        generate.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body(r#"{"error": "model exploded"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "m".to_string());
        let err = client.complete(&messages()).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), "m".to_string());
        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/".to_string(), "m".to_string());
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model_name(), "m");
    }
}
