// web-server/src/api/context.rs
use actix_web::{web, HttpRequest, HttpResponse};
use common::models::ContextPart;

use crate::admin::check_admin;
use crate::error::ProxyError;
use crate::proxy::{dispatch, parse_json_body, AppState, ProxyRoute};

pub async fn get_context(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    dispatch(&req, &state, ProxyRoute::get("/context"), None).await
}

/// Replace context parts; admin wallets only
pub async fn update_context(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let check = check_admin(&req, &state.config.admin);
    if !check.is_admin {
        tracing::warn!("Admin access denied for wallet {}", check.wallet);
        return Err(ProxyError::Forbidden {
            wallet: check.wallet,
        });
    }

    let parts: Vec<ContextPart> = serde_json::from_value(parse_json_body(&payload)?)
        .map_err(|e| ProxyError::BadRequest(format!("Invalid context parts: {}", e)))?;

    tracing::info!("Updating {} context part(s)", parts.len());

    let body = serde_json::to_value(parts)?;
    Ok(dispatch(&req, &state, ProxyRoute::post("/context").admin_only(), Some(body)).await)
}
