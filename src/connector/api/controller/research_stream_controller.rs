use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures_util::{Stream, StreamExt};

use crate::domain::{ChatRequest, StreamEvent};

use super::super::Container;

const FALLBACK_ERROR_FRAME: &str = r#"{"type":"error","message":"internal error"}"#;

/// `POST /chat/research/stream`: one `data:` frame per [`StreamEvent`]; the
/// response ends after the terminal event.
pub struct ResearchStreamController;

impl ResearchStreamController {
    pub async fn handle(
        State(container): State<Arc<Container>>,
        Json(request): Json<ChatRequest>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let events = container.research_chat_use_case().stream(&request.query);
        Sse::new(events.map(|event| Ok(to_sse_event(&event))))
    }
}

pub fn to_sse_event(event: &StreamEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|_| FALLBACK_ERROR_FRAME.to_string());
    Event::default().data(data)
}
