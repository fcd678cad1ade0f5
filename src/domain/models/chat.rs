use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of both chat endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Result of a synchronous research chat.
///
/// Serialized with the wire names `research_summary` / `research_documents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(rename = "research_summary")]
    summary: String,
    #[serde(rename = "research_documents")]
    document: String,
}

impl ChatResponse {
    pub fn new(summary: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            document: document.into(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn document(&self) -> &str {
        &self.document
    }
}

/// Structured output requested from the model in structured mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchGeneration {
    /// Summary of the processing/generation process
    #[serde(default)]
    pub processing_summary: Option<String>,

    /// Title for the generated document
    #[serde(default)]
    pub document_title: Option<String>,

    /// Generated Software Requirements Specification document
    #[serde(default)]
    pub research_document: Option<String>,
}

impl ResearchGeneration {
    /// Name under which the schema is registered with the provider.
    pub const SCHEMA_NAME: &'static str = "ResearchGenerationResponse";
}

impl From<ResearchGeneration> for ChatResponse {
    fn from(generation: ResearchGeneration) -> Self {
        ChatResponse::new(
            generation.processing_summary.unwrap_or_default(),
            generation.research_document.unwrap_or_default(),
        )
    }
}
