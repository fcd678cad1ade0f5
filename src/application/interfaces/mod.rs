mod chat_model;
mod prompt_template_store;

pub use chat_model::*;
pub use prompt_template_store::*;
