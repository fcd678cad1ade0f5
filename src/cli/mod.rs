use std::path::PathBuf;

use clap::Parser;

use crate::application::RESEARCH_PROMPT_NAME;
use crate::connector::{ContainerConfig, DEFAULT_PROMPTS_DIR, DEFAULT_PROMPT_FILE};

#[derive(Parser, Debug)]
#[command(name = "research-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of ENVIRONMENT
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Directory holding prompt template files
    #[arg(long, default_value = DEFAULT_PROMPTS_DIR)]
    pub prompts_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_PROMPT_FILE)]
    pub prompt_file: String,

    /// Name of the template inside the prompt file
    #[arg(long, default_value = RESEARCH_PROMPT_NAME)]
    pub prompt_name: String,

    /// Answer with a scripted offline model; OPENAI_API_KEY is not needed
    #[arg(long)]
    pub mock_llm: bool,

    /// Deployment environment; "development" enables debug logging
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.verbose || self.environment.eq_ignore_ascii_case("development") {
            "debug"
        } else {
            "info"
        }
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset: this crate at
    /// [`Self::log_level`], dependencies at warn.
    pub fn log_directive(&self) -> String {
        format!("warn,research_agent={}", self.log_level())
    }

    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            prompts_dir: self.prompts_dir.clone(),
            prompt_file: self.prompt_file.clone(),
            prompt_name: self.prompt_name.clone(),
            mock_llm: self.mock_llm,
        }
    }
}
