use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Placeholder substituted with the caller's query in `user_prompt_template`.
pub const USER_INPUT_PLACEHOLDER: &str = "{user_input}";

const MAX_TEMPERATURE: f32 = 2.0;

/// A named prompt configuration: which model to call, how to sample it, and
/// the system/user text wrapped around each query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(rename = "model")]
    model_id: String,
    #[serde(default)]
    temperature: f32,
    /// Legacy single-prompt field; treated as the system prompt when
    /// `system_prompt` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    user_prompt_template: Option<String>,
}

impl PromptTemplate {
    pub fn new(model_id: impl Into<String>, temperature: f32) -> Self {
        Self {
            model_id: model_id.into(),
            temperature,
            prompt: None,
            system_prompt: None,
            user_prompt_template: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_user_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.user_prompt_template = Some(template.into());
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .or(self.prompt.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn user_prompt_template(&self) -> Option<&str> {
        self.user_prompt_template
            .as_deref()
            .filter(|s| !s.is_empty())
    }

    /// The user message content for `query`: the template with every
    /// placeholder replaced, or the raw query when no template is set.
    pub fn render_user_prompt(&self, query: &str) -> String {
        match self.user_prompt_template() {
            Some(template) => template.replace(USER_INPUT_PLACEHOLDER, query),
            None => query.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.model_id.trim().is_empty() {
            return Err(DomainError::configuration(
                "prompt template has an empty model id",
            ));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(DomainError::configuration(format!(
                "temperature {} is outside 0.0..={}",
                self.temperature, MAX_TEMPERATURE
            )));
        }
        Ok(())
    }
}
