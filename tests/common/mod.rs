//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use research_agent::{
    ChatModelFactory, Container, ContainerConfig, DomainError, PromptTemplate,
    PromptTemplateStore, RESEARCH_PROMPT_NAME,
};

/// Serves a single in-memory template under any name.
pub struct StaticTemplateStore(pub PromptTemplate);

impl PromptTemplateStore for StaticTemplateStore {
    fn load(&self, _name: &str) -> Result<PromptTemplate, DomainError> {
        Ok(self.0.clone())
    }
}

pub fn research_template() -> PromptTemplate {
    PromptTemplate::new("gpt-4o-mini", 0.0)
        .with_system_prompt("You are a requirements analyst.")
        .with_user_prompt_template("Research: {user_input}")
}

pub fn container(template: PromptTemplate, factory: Arc<dyn ChatModelFactory>) -> Container {
    let config = ContainerConfig {
        prompts_dir: PathBuf::from("prompts"),
        prompt_file: "research_prompt.yml".to_string(),
        prompt_name: RESEARCH_PROMPT_NAME.to_string(),
        mock_llm: false,
    };
    Container::with_components(config, &StaticTemplateStore(template), factory)
        .expect("Failed to build container")
}

/// Serve `app` on an ephemeral localhost port.
pub async fn spawn(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    addr
}

/// Split an SSE body into the JSON payloads of its `data:` frames.
pub fn sse_payloads(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("Frame is not JSON"))
        .collect()
}
