use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::domain::{ChatRequest, ChatResponse};

use super::super::Container;
use super::ApiError;

/// `POST /chat/research`: one structured reply per query. Failures are
/// logged by the use case.
pub struct ResearchController;

impl ResearchController {
    pub async fn handle(
        State(container): State<Arc<Container>>,
        Json(request): Json<ChatRequest>,
    ) -> Result<Json<ChatResponse>, ApiError> {
        let response = container
            .research_chat_use_case()
            .respond(&request.query)
            .await?;

        Ok(Json(response))
    }
}
