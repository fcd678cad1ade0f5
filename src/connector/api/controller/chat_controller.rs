use axum::Json;
use serde_json::{json, Value};

/// `GET /chat` liveness placeholder.
pub struct ChatController;

impl ChatController {
    pub async fn handle() -> Json<Value> {
        Json(json!({ "message": "This is the chat endpoint" }))
    }
}
