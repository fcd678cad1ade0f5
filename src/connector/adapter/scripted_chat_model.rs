use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{ChatModelFactory, StreamingChatModel, StructuredChatModel, TokenStream};
use crate::domain::{
    truncate_chars, ChatMessage, DomainError, ModelSettings, OutputSchema, Role, SUMMARY_MAX_CHARS,
};

/// What a [`ScriptedChatModel`] answers with.
///
/// Unscripted replies echo the last user message, which keeps `--mock-llm`
/// useful without any setup.
#[derive(Debug, Clone, Default)]
pub struct ChatScript {
    structured_reply: Option<Value>,
    structured_failure: Option<String>,
    chunks: Option<Vec<String>>,
    stream_failure: Option<(usize, String)>,
}

/// Builds [`ScriptedChatModel`]s sharing one script and one call log.
#[derive(Clone, Default)]
pub struct ScriptedChatModelFactory {
    script: ChatScript,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    structured_builds: Arc<AtomicUsize>,
    streaming_builds: Arc<AtomicUsize>,
}

impl ScriptedChatModelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply returned by structured invocations.
    pub fn with_structured_reply(mut self, reply: Value) -> Self {
        self.script.structured_reply = Some(reply);
        self
    }

    /// Make structured invocations fail with a model invocation error.
    pub fn with_structured_failure(mut self, message: impl Into<String>) -> Self {
        self.script.structured_failure = Some(message.into());
        self
    }

    /// Fragments yielded by streaming invocations.
    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script.chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Fail the stream with `message` once `after` fragments were yielded.
    pub fn with_stream_failure_after(mut self, after: usize, message: impl Into<String>) -> Self {
        self.script.stream_failure = Some((after, message.into()));
        self
    }

    /// Messages received by every model built from this factory, in call order.
    pub async fn recorded_messages(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().await.clone()
    }

    pub fn structured_builds(&self) -> usize {
        self.structured_builds.load(Ordering::SeqCst)
    }

    pub fn streaming_builds(&self) -> usize {
        self.streaming_builds.load(Ordering::SeqCst)
    }

    fn build(&self) -> ScriptedChatModel {
        ScriptedChatModel {
            script: self.script.clone(),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl ChatModelFactory for ScriptedChatModelFactory {
    fn structured(
        &self,
        settings: &ModelSettings,
        schema: OutputSchema,
    ) -> Result<Arc<dyn StructuredChatModel>, DomainError> {
        debug!(
            "Creating scripted structured model for {} ({})",
            settings.model_id,
            schema.name()
        );
        self.structured_builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.build()))
    }

    fn streaming(
        &self,
        settings: &ModelSettings,
    ) -> Result<Arc<dyn StreamingChatModel>, DomainError> {
        debug!("Creating scripted streaming model for {}", settings.model_id);
        self.streaming_builds.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.build()))
    }
}

/// Deterministic offline model for local runs and tests.
pub struct ScriptedChatModel {
    script: ChatScript,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedChatModel {
    async fn record(&self, messages: &[ChatMessage]) {
        self.calls.lock().await.push(messages.to_vec());
    }

    fn echo_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    /// Splits `text` into word fragments that concatenate back to `text`.
    fn echo_chunks(text: &str) -> Vec<String> {
        text.split_inclusive(' ').map(String::from).collect()
    }
}

#[async_trait]
impl StructuredChatModel for ScriptedChatModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<Value, DomainError> {
        self.record(messages).await;

        if let Some(message) = &self.script.structured_failure {
            return Err(DomainError::model_invocation(message.clone()));
        }

        Ok(match &self.script.structured_reply {
            Some(reply) => reply.clone(),
            None => {
                let text = Self::echo_text(messages);
                json!({
                    "processing_summary": truncate_chars(&text, SUMMARY_MAX_CHARS),
                    "research_document": text,
                })
            }
        })
    }
}

#[async_trait]
impl StreamingChatModel for ScriptedChatModel {
    async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError> {
        self.record(messages).await;

        let chunks = match &self.script.chunks {
            Some(chunks) => chunks.clone(),
            None => Self::echo_chunks(&Self::echo_text(messages)),
        };

        let mut items: Vec<Result<String, DomainError>> = Vec::with_capacity(chunks.len() + 1);
        match &self.script.stream_failure {
            Some((after, message)) => {
                items.extend(chunks.into_iter().take(*after).map(Ok));
                items.push(Err(DomainError::model_invocation(message.clone())));
            }
            None => items.extend(chunks.into_iter().map(Ok)),
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
