pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    query_preview, ChatModelFactory, PromptTemplateStore, ResearchChatUseCase,
    StreamingChatModel, StructuredChatModel, TokenStream, RESEARCH_PROMPT_NAME,
};

pub use connector::{
    Container, ContainerConfig, OpenAiChatModelFactory, OpenAiConfig, ScriptedChatModelFactory,
    YamlPromptTemplateStore,
};

pub use domain::{
    ChatMessage, ChatRequest, ChatResponse, DomainError, ModelSettings, OutputSchema,
    PromptTemplate, ResearchGeneration, Role, StreamEvent,
};
