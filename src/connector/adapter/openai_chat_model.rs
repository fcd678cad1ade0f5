use std::future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::{ChatModelFactory, StreamingChatModel, StructuredChatModel, TokenStream};
use crate::domain::{ChatMessage, DomainError, ModelSettings, OutputSchema};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Connection settings for the OpenAI chat completions API (or any
/// compatible server).
///
/// | Variable              | Default                  | Purpose                  |
/// |-----------------------|--------------------------|--------------------------|
/// | `OPENAI_API_KEY`      | required                 | Bearer credential        |
/// | `OPENAI_BASE_URL`     | `https://api.openai.com` | Any compatible server    |
/// | `OPENAI_TIMEOUT_SECS` | `120`                    | Structured request limit |
#[derive(Clone)]
pub struct OpenAiConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            api_key: api_key.into(),
            base_url: base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from an arbitrary variable source. A missing or blank
    /// `OPENAI_API_KEY` is a configuration error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("OPENAI_API_KEY is required but not provided")
            })?;
        let base_url = lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(api_key, base_url);
        if let Some(raw) = lookup("OPENAI_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                DomainError::configuration(format!("OPENAI_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builds OpenAI-backed model clients; every call yields a new client.
pub struct OpenAiChatModelFactory {
    config: OpenAiConfig,
}

impl OpenAiChatModelFactory {
    pub fn new(config: OpenAiConfig) -> Self {
        Self { config }
    }
}

impl ChatModelFactory for OpenAiChatModelFactory {
    fn structured(
        &self,
        settings: &ModelSettings,
        schema: OutputSchema,
    ) -> Result<Arc<dyn StructuredChatModel>, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {e}")))?;

        debug!(
            "Created structured LLM - Model: {}, Temperature: {}, Schema: {}",
            settings.model_id,
            settings.temperature,
            schema.name()
        );
        Ok(Arc::new(OpenAiStructuredModel {
            endpoint: Endpoint::new(client, &self.config, settings),
            schema,
        }))
    }

    fn streaming(
        &self,
        settings: &ModelSettings,
    ) -> Result<Arc<dyn StreamingChatModel>, DomainError> {
        // No overall timeout: it would cut long streams short.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {e}")))?;

        debug!(
            "Created streaming LLM - Model: {}, Temperature: {}",
            settings.model_id, settings.temperature
        );
        Ok(Arc::new(OpenAiStreamingModel {
            endpoint: Endpoint::new(client, &self.config, settings),
        }))
    }
}

struct Endpoint {
    client: reqwest::Client,
    api_key: String,
    url: String,
    settings: ModelSettings,
}

impl Endpoint {
    fn new(client: reqwest::Client, config: &OpenAiConfig, settings: &ModelSettings) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            url: format!("{}{}", config.base_url, COMPLETIONS_PATH),
            settings: settings.clone(),
        }
    }

    fn request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        response_format: Option<ResponseFormat<'a>>,
        stream: bool,
    ) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.settings.model_id,
            temperature: self.settings.temperature,
            messages: messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            response_format,
            stream,
        }
    }

    async fn send(&self, request: &ApiRequest<'_>) -> Result<reqwest::Response, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::model_invocation(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OpenAI API returned {status}: {body}");
            return Err(DomainError::model_invocation(format!(
                "OpenAI API returned {status}"
            )));
        }

        Ok(response)
    }
}

/// Chat completions client that asks the provider for a `json_schema`
/// shaped reply.
pub struct OpenAiStructuredModel {
    endpoint: Endpoint,
    schema: OutputSchema,
}

#[async_trait]
impl StructuredChatModel for OpenAiStructuredModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<Value, DomainError> {
        let response_format = ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: self.schema.name(),
                schema: self.schema.schema(),
                strict: false,
            },
        };
        let request = self.endpoint.request(messages, Some(response_format), false);

        let api_response: ApiResponse = self
            .endpoint
            .send(&request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::model_invocation(format!("failed to parse response: {e}")))?;

        parse_structured_reply(api_response)
    }
}

/// Chat completions client yielding `delta.content` fragments as they arrive.
pub struct OpenAiStreamingModel {
    endpoint: Endpoint,
}

#[async_trait]
impl StreamingChatModel for OpenAiStreamingModel {
    async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError> {
        let request = self.endpoint.request(messages, None, true);
        let response = self.endpoint.send(&request).await?;

        let tokens = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| {
                future::ready(!matches!(event, Ok(e) if e.data.trim() == DONE_SENTINEL))
            })
            .filter_map(|event| {
                future::ready(match event {
                    Ok(event) => parse_stream_data(&event.data).transpose(),
                    Err(e) => Some(Err(DomainError::model_invocation(format!(
                        "stream interrupted: {e}"
                    )))),
                })
            });

        Ok(Box::pin(tokens))
    }
}

fn parse_structured_reply(response: ApiResponse) -> Result<Value, DomainError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| DomainError::schema_coercion("response contained no choices"))?;

    if let Some(refusal) = message.refusal {
        return Err(DomainError::schema_coercion(format!(
            "model refused to answer: {refusal}"
        )));
    }

    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| DomainError::schema_coercion("response contained no content"))?;

    serde_json::from_str(&content)
        .map_err(|e| DomainError::schema_coercion(format!("reply is not valid JSON: {e}")))
}

/// Content carried by one SSE `data` payload, if any.
fn parse_stream_data(data: &str) -> Result<Option<String>, DomainError> {
    if data.trim().is_empty() {
        return Ok(None);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| DomainError::model_invocation(format!("malformed stream chunk: {e}")))?;

    if let Some(error) = chunk.error {
        return Err(DomainError::model_invocation(error.message));
    }

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}
