use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Schema coercion error: {0}")]
    SchemaCoercion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn model_invocation(msg: impl Into<String>) -> Self {
        Self::ModelInvocation(msg.into())
    }

    pub fn schema_coercion(msg: impl Into<String>) -> Self {
        Self::SchemaCoercion(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Errors raised by the upstream provider, surfaced to HTTP callers as 500.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::ModelInvocation(_) | Self::SchemaCoercion(_))
    }
}
