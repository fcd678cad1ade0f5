mod openai_chat_model;
mod scripted_chat_model;
mod yaml_prompt_template_store;

pub use openai_chat_model::*;
pub use scripted_chat_model::*;
pub use yaml_prompt_template_store::*;
