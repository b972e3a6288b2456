// web-server/src/api/interactive.rs
use actix_web::{web, HttpRequest, HttpResponse};
use common::{ChatPost, InteractiveRequest};

use crate::error::ProxyError;
use crate::proxy::{dispatch, parse_json_body, AppState, ProxyRoute};

pub async fn post_message(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let request: InteractiveRequest = serde_json::from_value(parse_json_body(&payload)?)
        .map_err(|_| ProxyError::BadRequest("Message content and author required".to_string()))?;

    tracing::info!(
        author = %request.data.author,
        chars = request.data.content.chars().count(),
        "Forwarding chat message"
    );

    let body = serde_json::to_value(ChatPost::message(request.data))?;
    Ok(dispatch(&req, &state, ProxyRoute::post("/api"), Some(body)).await)
}
