mod research_chat;

pub use research_chat::*;
