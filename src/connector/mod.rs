//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Model clients (OpenAI chat completions, scripted offline model)
//! - Prompt templates (YAML files)
//! - HTTP API (axum routes, controllers, dependency container)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::{Container, ContainerConfig};
