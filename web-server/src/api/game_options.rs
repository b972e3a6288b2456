// web-server/src/api/game_options.rs
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::ProxyError;
use crate::proxy::{dispatch, parse_json_body, AppState, ProxyRoute};

pub async fn get_game_options(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    dispatch(&req, &state, ProxyRoute::get("/game-options"), None).await
}

// The language -> interaction -> option tree is stored as sent
pub async fn set_game_options(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let body = parse_json_body(&payload)?;
    Ok(dispatch(&req, &state, ProxyRoute::post("/game-options"), Some(body)).await)
}
