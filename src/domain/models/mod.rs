mod chat;
mod chat_message;
mod model_settings;
mod prompt_template;
mod stream_event;

pub use chat::*;
pub use chat_message::*;
pub use model_settings::*;
pub use prompt_template::*;
pub use stream_event::*;
