use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use serde_json::Value;

use crate::domain::{ChatMessage, DomainError, ModelSettings, OutputSchema};

/// Incremental content fragments of a streamed reply, in arrival order.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// A model client bound to an [`OutputSchema`]: every reply is coerced into
/// that shape by the provider.
#[async_trait]
pub trait StructuredChatModel: Send + Sync {
    /// Send `messages` and return the decoded JSON reply.
    ///
    /// Fails with [`DomainError::SchemaCoercion`] when the provider cannot
    /// produce conforming output.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<Value, DomainError>;
}

/// A model client returning raw content as it is generated.
#[async_trait]
pub trait StreamingChatModel: Send + Sync {
    /// Start a completion. The returned stream is finite and ends when the
    /// provider signals completion; each call starts a new stream.
    async fn stream(&self, messages: &[ChatMessage]) -> Result<TokenStream, DomainError>;
}

/// Builds model clients. Structured and streaming clients are separate
/// instances since a schema-bound client cannot stream raw tokens.
pub trait ChatModelFactory: Send + Sync {
    fn structured(
        &self,
        settings: &ModelSettings,
        schema: OutputSchema,
    ) -> Result<Arc<dyn StructuredChatModel>, DomainError>;

    fn streaming(
        &self,
        settings: &ModelSettings,
    ) -> Result<Arc<dyn StreamingChatModel>, DomainError>;
}
