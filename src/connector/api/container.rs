use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ChatModelFactory, PromptTemplateStore, ResearchChatUseCase};
use crate::connector::adapter::{
    OpenAiChatModelFactory, OpenAiConfig, ScriptedChatModelFactory, YamlPromptTemplateStore,
};
use crate::domain::DomainError;

pub struct ContainerConfig {
    pub prompts_dir: PathBuf,
    pub prompt_file: String,
    pub prompt_name: String,
    /// Answer with the offline scripted model instead of calling OpenAI.
    /// No credential is required in this mode.
    pub mock_llm: bool,
}

/// Wires the research chat use case from configuration. Built once at
/// startup and shared with every request handler.
pub struct Container {
    research_chat: Arc<ResearchChatUseCase>,
    config: ContainerConfig,
}

impl Container {
    /// Build from the process environment.
    pub fn new(config: ContainerConfig) -> Result<Self, DomainError> {
        Self::new_with_env(config, |name| std::env::var(name).ok())
    }

    /// Build reading provider settings through `lookup`. The credential is
    /// checked before the prompt template is read.
    pub fn new_with_env(
        config: ContainerConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomainError> {
        let model_factory: Arc<dyn ChatModelFactory> = if config.mock_llm {
            info!("Using scripted offline model");
            Arc::new(ScriptedChatModelFactory::new())
        } else {
            let openai = OpenAiConfig::from_lookup(lookup)?;
            debug!("Using OpenAI chat completions at {}", openai.base_url());
            Arc::new(OpenAiChatModelFactory::new(openai))
        };

        let store = YamlPromptTemplateStore::in_dir(&config.prompts_dir, &config.prompt_file);
        debug!("Loading prompt '{}' from {}", config.prompt_name, store.path().display());

        Self::with_components(config, &store, model_factory)
    }

    /// Build from explicit components.
    pub fn with_components(
        config: ContainerConfig,
        store: &dyn PromptTemplateStore,
        model_factory: Arc<dyn ChatModelFactory>,
    ) -> Result<Self, DomainError> {
        let research_chat =
            ResearchChatUseCase::from_store(store, &config.prompt_name, model_factory)?;

        Ok(Self {
            research_chat: Arc::new(research_chat),
            config,
        })
    }

    pub fn research_chat_use_case(&self) -> Arc<ResearchChatUseCase> {
        self.research_chat.clone()
    }

    pub fn prompt_name(&self) -> &str {
        &self.config.prompt_name
    }

    pub fn mock_llm(&self) -> bool {
        self.config.mock_llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn prompts_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("research_prompt.yml")).unwrap();
        file.write_all(b"RESEARCH_ANALYZER:\n  model: gpt-4o-mini\n")
            .unwrap();
        dir
    }

    fn config(dir: &tempfile::TempDir, mock_llm: bool) -> ContainerConfig {
        ContainerConfig {
            prompts_dir: dir.path().to_path_buf(),
            prompt_file: "research_prompt.yml".to_string(),
            prompt_name: "RESEARCH_ANALYZER".to_string(),
            mock_llm,
        }
    }

    #[test]
    fn missing_credential_fails_startup() {
        let dir = prompts_dir();
        let result = Container::new_with_env(config(&dir, false), |_| None);

        assert!(matches!(result, Err(ref e) if e.is_configuration()));
    }

    #[test]
    fn credential_present_builds_container() {
        let dir = prompts_dir();
        let container = Container::new_with_env(config(&dir, false), |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        })
        .unwrap();

        assert_eq!(
            container.research_chat_use_case().template().model_id(),
            "gpt-4o-mini"
        );
        assert!(!container.mock_llm());
    }

    #[test]
    fn mock_llm_needs_no_credential() {
        let dir = prompts_dir();
        let container = Container::new_with_env(config(&dir, true), |_| None).unwrap();

        assert!(container.mock_llm());
        assert_eq!(container.prompt_name(), "RESEARCH_ANALYZER");
    }

    #[test]
    fn missing_template_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let result = Container::new_with_env(config(&dir, true), |_| None);

        assert!(matches!(result, Err(ref e) if e.is_configuration()));
    }
}
