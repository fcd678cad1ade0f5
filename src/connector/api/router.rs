use std::sync::Arc;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::container::Container;
use super::controller::{ChatController, ResearchController, ResearchStreamController};

/// Prefix the web client uses; the same routes are also served unprefixed.
pub const API_PREFIX: &str = "/api/v1";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP routes of the service.
pub fn routes(container: Arc<Container>) -> Router {
    let chat = Router::new()
        .route("/chat", get(ChatController::handle))
        .route("/chat/research", post(ResearchController::handle))
        .route(
            "/chat/research/stream",
            post(ResearchStreamController::handle),
        )
        .with_state(container);

    Router::new()
        .nest(API_PREFIX, chat.clone())
        .merge(chat)
        .layer(middleware::from_fn(tag_request))
}

/// Runs each request inside a span carrying a fresh request id, echoed back
/// in `x-request-id`.
async fn tag_request(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "request",
        id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
