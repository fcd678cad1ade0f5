use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PromptTemplate;

/// Sampling configuration a model client is built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model_id: String,
    pub temperature: f32,
}

impl ModelSettings {
    pub fn new(model_id: impl Into<String>, temperature: f32) -> Self {
        Self {
            model_id: model_id.into(),
            temperature,
        }
    }
}

impl From<&PromptTemplate> for ModelSettings {
    fn from(template: &PromptTemplate) -> Self {
        Self::new(template.model_id(), template.temperature())
    }
}

/// A named JSON schema the provider is asked to shape its reply into.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    name: String,
    schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Derive the schema of `T`, dropping the `$schema` meta keyword that
    /// providers do not accept.
    pub fn for_type<T: JsonSchema>(name: impl Into<String>) -> Self {
        let mut schema = schemars::schema_for!(T).to_value();
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
        }
        Self::new(name, schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}
