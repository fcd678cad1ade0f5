use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::application::{ChatModelFactory, PromptTemplateStore, StructuredChatModel};
use crate::domain::{
    truncate_chars, ChatMessage, ChatResponse, DomainError, ModelSettings, OutputSchema,
    PromptTemplate, ResearchGeneration, StreamEvent,
};

/// Prompt name the research template is registered under.
pub const RESEARCH_PROMPT_NAME: &str = "RESEARCH_ANALYZER";

const QUERY_PREVIEW_CHARS: usize = 100;

/// Answers research queries with a single model call, either as one
/// structured reply or as a stream of tokens.
pub struct ResearchChatUseCase {
    template: PromptTemplate,
    model_factory: Arc<dyn ChatModelFactory>,
    structured_model: OnceCell<Arc<dyn StructuredChatModel>>,
}

impl ResearchChatUseCase {
    pub fn new(template: PromptTemplate, model_factory: Arc<dyn ChatModelFactory>) -> Self {
        info!(
            "Research chat initialized - Model: {}, Temperature: {}",
            template.model_id(),
            template.temperature()
        );
        Self {
            template,
            model_factory,
            structured_model: OnceCell::new(),
        }
    }

    /// Load the template `name` from `store` and build the use case around it.
    pub fn from_store(
        store: &dyn PromptTemplateStore,
        name: &str,
        model_factory: Arc<dyn ChatModelFactory>,
    ) -> Result<Self, DomainError> {
        let template = store.load(name)?;
        Ok(Self::new(template, model_factory))
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// System prompt (when configured) followed by the rendered user prompt.
    pub fn build_messages(&self, query: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = self.template.system_prompt() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(self.template.render_user_prompt(query)));

        messages
    }

    pub async fn respond(&self, query: &str) -> Result<ChatResponse, DomainError> {
        validate_query(query).inspect_err(|e| warn!("Rejected research request: {}", e))?;

        debug!(
            "Research chat started - Input: '{}' (length: {})",
            query_preview(query),
            query.chars().count()
        );

        let start_time = Instant::now();
        let messages = self.build_messages(query);
        let model = self.structured_model().await.inspect_err(|e| {
            error!(
                "Failed to create structured LLM - Input: '{}', Error: {}",
                query_preview(query),
                e
            )
        })?;

        let reply = model.invoke(&messages).await.map_err(|e| {
            error!(
                "LLM invocation failed - Input: '{}', Error: {}",
                query_preview(query),
                e
            );
            e
        })?;

        let generation: ResearchGeneration = serde_json::from_value(reply).map_err(|e| {
            error!(
                "LLM reply does not match {} - Input: '{}', Error: {}",
                ResearchGeneration::SCHEMA_NAME,
                query_preview(query),
                e
            );
            DomainError::schema_coercion(format!(
                "reply does not match {}: {}",
                ResearchGeneration::SCHEMA_NAME,
                e
            ))
        })?;

        let response = ChatResponse::from(generation);
        info!(
            "LLM invocation completed - Summary length: {} chars in {:.2}s",
            response.summary().chars().count(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(response)
    }

    /// Stream the reply to `query` as `text` events followed by exactly one
    /// `done` or `error` event.
    pub fn stream(&self, query: &str) -> BoxStream<'static, StreamEvent> {
        let validation = validate_query(query);
        let factory = Arc::clone(&self.model_factory);
        let settings = ModelSettings::from(&self.template);
        let messages = self.build_messages(query);
        let preview = query_preview(query);
        let query_len = query.chars().count();

        Box::pin(stream! {
            if let Err(e) = validation {
                warn!("Rejected streaming request: {}", e);
                yield StreamEvent::error(e.to_string());
                return;
            }

            debug!("Streaming started - Input: '{}' (length: {})", preview, query_len);

            // Streaming clients are never reused: the memoized client is schema-bound.
            let model = match factory.streaming(&settings) {
                Ok(model) => model,
                Err(e) => {
                    error!("Failed to create streaming LLM - Input: '{}', Error: {}", preview, e);
                    yield StreamEvent::error(e.to_string());
                    return;
                }
            };

            let mut tokens = match model.stream(&messages).await {
                Ok(tokens) => tokens,
                Err(e) => {
                    error!("Streaming failed to start - Input: '{}', Error: {}", preview, e);
                    yield StreamEvent::error(e.to_string());
                    return;
                }
            };

            let mut accumulated = String::new();
            let mut chunk_count = 0usize;

            while let Some(item) = tokens.next().await {
                match item {
                    Ok(chunk) if chunk.is_empty() => {}
                    Ok(chunk) => {
                        accumulated.push_str(&chunk);
                        chunk_count += 1;
                        yield StreamEvent::text(chunk);
                    }
                    Err(e) => {
                        error!(
                            "Streaming failed - Input: '{}', Chunks sent: {}, Error: {}",
                            preview, chunk_count, e
                        );
                        yield StreamEvent::error(e.to_string());
                        return;
                    }
                }
            }

            info!(
                "Streaming completed - Chunks: {}, Content length: {} chars",
                chunk_count,
                accumulated.chars().count()
            );
            yield StreamEvent::done(accumulated);
        })
    }

    async fn structured_model(&self) -> Result<Arc<dyn StructuredChatModel>, DomainError> {
        let model = self
            .structured_model
            .get_or_try_init(|| async {
                debug!("Creating structured LLM for {}", self.template.model_id());
                self.model_factory.structured(
                    &ModelSettings::from(&self.template),
                    OutputSchema::for_type::<ResearchGeneration>(ResearchGeneration::SCHEMA_NAME),
                )
            })
            .await?;

        Ok(Arc::clone(model))
    }
}

fn validate_query(query: &str) -> Result<(), DomainError> {
    if query.is_empty() {
        return Err(DomainError::invalid_input("query must not be empty"));
    }
    Ok(())
}

/// Log-friendly prefix of a query.
pub fn query_preview(query: &str) -> String {
    let preview = truncate_chars(query, QUERY_PREVIEW_CHARS);
    if preview.len() < query.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ScriptedChatModelFactory;
    use crate::domain::Role;

    fn use_case(template: PromptTemplate) -> ResearchChatUseCase {
        ResearchChatUseCase::new(template, Arc::new(ScriptedChatModelFactory::new()))
    }

    #[test]
    fn messages_include_system_and_templated_user() {
        let template = PromptTemplate::new("gpt-4o-mini", 0.0)
            .with_system_prompt("You write SRS documents.")
            .with_user_prompt_template("Requirements for: {user_input}");

        let messages = use_case(template).build_messages("a login system");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You write SRS documents.");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Requirements for: a login system");
    }

    #[test]
    fn messages_without_prompts_are_raw_query() {
        let messages = use_case(PromptTemplate::new("gpt-4o-mini", 0.0)).build_messages("hi");

        assert_eq!(messages, vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn query_preview_truncates_long_queries() {
        let long = "q".repeat(150);
        let preview = query_preview(&long);

        assert_eq!(preview.len(), QUERY_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
        assert_eq!(query_preview("short"), "short");
    }

    #[tokio::test]
    async fn respond_rejects_empty_query() {
        let err = use_case(PromptTemplate::new("gpt-4o-mini", 0.0))
            .respond("")
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn respond_forwards_whitespace_query_unchanged() {
        let factory = ScriptedChatModelFactory::new();
        let use_case = ResearchChatUseCase::new(
            PromptTemplate::new("gpt-4o-mini", 0.0),
            Arc::new(factory.clone()),
        );

        let response = use_case.respond("   ").await.unwrap();

        assert_eq!(response.document(), "   ");
        assert_eq!(
            factory.recorded_messages().await,
            vec![vec![ChatMessage::user("   ")]]
        );
    }

    #[tokio::test]
    async fn stream_rejects_empty_query_with_single_error() {
        let events: Vec<StreamEvent> = use_case(PromptTemplate::new("gpt-4o-mini", 0.0))
            .stream("")
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error { .. }));
    }
}
