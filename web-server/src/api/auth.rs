// web-server/src/api/auth.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use serde_json::json;

use crate::admin::check_admin;
use crate::proxy::AppState;
use crate::token_manager::TokenStore;

pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Qawakun Web Proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// Hand the browser the current backend token, logging in if needed
pub async fn token(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let mut store = TokenStore::from_request(&req);

    let mut response = match state.tokens.get_token(&mut store).await {
        Ok(token) => HttpResponse::Ok().json(json!({ "token": token })),
        Err(err) => {
            tracing::error!("Error in token route: {}", err);
            err.error_response()
        }
    };

    store.apply(&mut response, state.tokens.secure_cookies());
    response
}

// Lets the dashboard decide whether to show admin tools
pub async fn admin_status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(check_admin(&req, &state.config.admin))
}
