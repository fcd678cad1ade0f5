//! # Domain Layer
//!
//! Prompt templates, chat messages, response contracts and errors.
//! This layer is independent of the HTTP server and the model provider.

mod error;
pub mod models;

pub use error::DomainError;
pub use models::*;
