use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::PromptTemplateStore;
use crate::domain::{DomainError, PromptTemplate};

pub const DEFAULT_PROMPTS_DIR: &str = "prompts";
pub const DEFAULT_PROMPT_FILE: &str = "research_prompt.yml";

/// Reads prompt templates from a YAML file mapping prompt names to
/// templates:
///
/// ```yaml
/// RESEARCH_ANALYZER:
///   model: gpt-4o-mini
///   temperature: 0.2
///   system_prompt: You are a requirements analyst.
///   user_prompt_template: "Analyze: {user_input}"
/// ```
pub struct YamlPromptTemplateStore {
    path: PathBuf,
}

impl YamlPromptTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `file_name` inside `prompts_dir`.
    pub fn in_dir(prompts_dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self::new(prompts_dir.as_ref().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, serde_yaml::Value>, DomainError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            DomainError::configuration(format!(
                "configuration file not found at: {} ({})",
                self.path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&raw).map_err(|e| {
            DomainError::configuration(format!(
                "Error parsing YAML configuration {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl PromptTemplateStore for YamlPromptTemplateStore {
    /// Only the entry under `name` is decoded; sibling entries may hold
    /// anything.
    fn load(&self, name: &str) -> Result<PromptTemplate, DomainError> {
        let mut entries = self.read_all()?;
        let entry = entries.remove(name).ok_or_else(|| {
            DomainError::configuration(format!(
                "prompt '{}' not defined in {}",
                name,
                self.path.display()
            ))
        })?;

        let template: PromptTemplate = serde_yaml::from_value(entry).map_err(|e| {
            DomainError::configuration(format!(
                "invalid prompt '{}' in {}: {}",
                name,
                self.path.display(),
                e
            ))
        })?;

        template.validate()?;
        debug!(
            "Loaded prompt '{}' from {} (model: {})",
            name,
            self.path.display(),
            template.model_id()
        );

        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_prompts(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_named_template() {
        let file = write_prompts(
            r#"
RESEARCH_ANALYZER:
  model: gpt-4o-mini
  temperature: 0.2
  system_prompt: You are a requirements analyst.
  user_prompt_template: "Analyze: {user_input}"
OTHER:
  model: gpt-4o
"#,
        );

        let template = YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .unwrap();

        assert_eq!(template.model_id(), "gpt-4o-mini");
        assert_eq!(template.temperature(), 0.2);
        assert_eq!(
            template.system_prompt(),
            Some("You are a requirements analyst.")
        );
        assert_eq!(template.render_user_prompt("login"), "Analyze: login");
    }

    #[test]
    fn unrelated_sibling_entries_are_ignored() {
        let file = write_prompts(
            r#"
RESEARCH_ANALYZER:
  model: gpt-4o-mini
NOTES:
  description: free-form notes kept next to the prompts
VERSION: 3
"#,
        );

        let template = YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .unwrap();

        assert_eq!(template.model_id(), "gpt-4o-mini");
    }

    #[test]
    fn malformed_named_entry_is_configuration_error() {
        let file = write_prompts("RESEARCH_ANALYZER:\n  temperature: 0.2\n");

        let err = YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("RESEARCH_ANALYZER"));
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = YamlPromptTemplateStore::in_dir("/definitely/not/here", DEFAULT_PROMPT_FILE)
            .load("RESEARCH_ANALYZER")
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("research_prompt.yml"));
    }

    #[test]
    fn unknown_prompt_name_is_configuration_error() {
        let file = write_prompts("OTHER:\n  model: gpt-4o\n");

        let err = YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn malformed_yaml_is_configuration_error() {
        let file = write_prompts("RESEARCH_ANALYZER: [unclosed\n");

        let err = YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn invalid_template_is_rejected() {
        let file = write_prompts("RESEARCH_ANALYZER:\n  model: gpt-4o\n  temperature: 9.0\n");

        assert!(YamlPromptTemplateStore::new(file.path())
            .load("RESEARCH_ANALYZER")
            .is_err());
    }
}
