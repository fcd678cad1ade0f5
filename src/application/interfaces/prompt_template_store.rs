use crate::domain::{DomainError, PromptTemplate};

/// Loads named prompt templates from external configuration.
pub trait PromptTemplateStore: Send + Sync {
    /// Load the template registered under `name`.
    ///
    /// Missing files, unknown names and invalid templates are all reported as
    /// [`DomainError::Configuration`].
    fn load(&self, name: &str) -> Result<PromptTemplate, DomainError>;
}
