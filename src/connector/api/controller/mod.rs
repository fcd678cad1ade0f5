pub mod api_error;
pub mod chat_controller;
pub mod research_controller;
pub mod research_stream_controller;

pub use api_error::ApiError;
pub use chat_controller::ChatController;
pub use research_controller::ResearchController;
pub use research_stream_controller::ResearchStreamController;
