//! Groq LLM Provider
//!
//! Implementation of `LlmProvider` for Groq's OpenAI-compatible chat
//! completions API.

use std::sync::Arc;
use std::time::Duration;

use assistant_core::{
    credential::Credential,
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderConnector,
        TokenUsage, DEFAULT_MODEL,
    },
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Groq provider configuration
#[derive(Clone, Debug)]
pub struct GroqConfig {
    /// API base URL, up to and including `/v1`
    pub base_url: String,

    /// Model used for every completion
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: 120,
        }
    }
}

impl GroqConfig {
    /// Read `GROQ_BASE_URL`, `GROQ_MODEL` and `GROQ_TIMEOUT_SECS`
    ///
    /// The API key is deliberately not read here; it comes from the user.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("GROQ_BASE_URL").unwrap_or(defaults.base_url);
        let model = std::env::var("GROQ_MODEL").unwrap_or(defaults.model);
        let timeout_secs = std::env::var("GROQ_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            model,
            timeout_secs,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
    owned_by: Option<String>,
    context_window: Option<u32>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Groq LLM provider bound to one user's key
pub struct GroqProvider {
    client: Client,
    config: GroqConfig,
    credential: Credential,
}

impl GroqProvider {
    /// Create a provider for `credential`
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: GroqConfig, credential: Credential) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            credential,
        })
    }

    /// Convert agent messages to the chat API format
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage<'_>> {
        messages
            .iter()
            .map(|m| ChatMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::Tool => "user", // Tools appear as user context
                },
                content: &m.content,
            })
            .collect()
    }

    /// Map a non-success response to an agent error
    async fn error_for(response: reqwest::Response) -> AgentError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error.message)
            .unwrap_or(text);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
            s if s.is_server_error() => AgentError::ProviderUnavailable(format!("{s}: {detail}")),
            s => AgentError::Provider(format!("{s}: {detail}")),
        }
    }

    fn transport_error(e: &reqwest::Error) -> AgentError {
        if e.is_timeout() || e.is_connect() {
            AgentError::ProviderUnavailable(e.to_string())
        } else {
            AgentError::Provider(e.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Groq health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: &options.stop_sequences,
        };

        tracing::debug!(model = %options.model, messages = messages.len(), "Groq completion");

        let response = self.client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(self.credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid completion body: {e}")))?;

        let choice = body.choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("completion had no choices".into()))?;

        let finish_reason = choice.finish_reason.as_deref().map(FinishReason::from_api);

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: body.model.unwrap_or_else(|| options.model.clone()),
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            truncated: finish_reason == Some(FinishReason::Length),
            finish_reason,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.client
            .get(self.config.endpoint("models"))
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid model list: {e}")))?;

        Ok(list.data
            .into_iter()
            .map(|m| ModelInfo {
                id: m.id,
                owned_by: m.owned_by,
                context_length: m.context_window,
            })
            .collect())
    }
}

/// Builds a [`GroqProvider`] per credential
#[derive(Clone, Debug, Default)]
pub struct GroqConnector {
    config: GroqConfig,
}

impl GroqConnector {
    #[must_use]
    pub const fn new(config: GroqConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GroqConfig::from_env())
    }

    #[must_use]
    pub const fn config(&self) -> &GroqConfig {
        &self.config
    }
}

impl ProviderConnector for GroqConnector {
    fn name(&self) -> &str {
        "Groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn connect(&self, credential: &Credential) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::new(GroqProvider::new(self.config.clone(), credential.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GroqProvider {
        let config = GroqConfig {
            base_url: format!("{}/openai/v1", server.uri()),
            ..Default::default()
        };
        GroqProvider::new(config, Credential::from_input("gsk_test").unwrap()).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = GroqConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "gemma2-9b-it");
        assert_eq!(config.endpoint("models"), "https://api.groq.com/openai/v1/models");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::tool("[Tool 'Wikipedia' returned]\nParis", None),
        ];

        let converted = GroqProvider::convert_messages(&messages);
        let roles: Vec<_> = converted.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "user"]);
    }

    #[tokio::test]
    async fn test_complete_basic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "gemma2-9b-it",
                "messages": [{"role": "user", "content": "2+2?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "model": "gemma2-9b-it",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "4"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
            })))
            .mount(&server)
            .await;

        let completion = provider(&server)
            .complete(&[Message::user("2+2?")], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.content, "4");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 11);
        assert!(!completion.truncated);
    }

    #[tokio::test]
    async fn test_invalid_key_maps_to_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Auth(ref m) if m == "Invalid API Key"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/openai/v1/models"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let groq = provider(&server);
        let err = groq
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::RateLimited(ref m) if m == "slow down"));

        assert!(matches!(groq.list_models().await, Err(AgentError::ProviderUnavailable(_))));
        assert!(!groq.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_list_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openai/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "gemma2-9b-it", "owned_by": "Google", "context_window": 8192}]
            })))
            .mount(&server)
            .await;

        let models = provider(&server).list_models().await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "gemma2-9b-it");
        assert_eq!(models[0].context_length, Some(8192));
    }

    #[test]
    fn test_connector_builds_provider() {
        let connector = GroqConnector::default();
        assert_eq!(connector.model(), "gemma2-9b-it");
        assert!(connector.connect(&Credential::from_input("gsk").unwrap()).is_ok());
    }
}
