// web-server/src/api/proposals.rs
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use common::models::UpdateData;
use serde_json::Value;

use crate::error::ProxyError;
use crate::proxy::{dispatch, parse_json_body, AppState, ProxyRoute};

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_update(payload: &web::Bytes) -> Result<UpdateData, ProxyError> {
    serde_json::from_value(parse_json_body(payload)?)
        .map_err(|e| ProxyError::BadRequest(format!("Invalid proposal update: {}", e)))
}

pub async fn list_proposals(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    dispatch(&req, &state, ProxyRoute::get("/proposals"), None).await
}

pub async fn list_winners(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    dispatch(&req, &state, ProxyRoute::get("/proposalsw"), None).await
}

/// Submit a new proposal, stamping the submission time if the client didn't
pub async fn submit_proposal(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let mut body = parse_json_body(&payload)?;
    let fields = body
        .as_object_mut()
        .ok_or_else(|| ProxyError::BadRequest("Proposal must be a JSON object".to_string()))?;
    fields
        .entry("timestamp")
        .or_insert_with(|| Value::String(now()));

    Ok(dispatch(&req, &state, ProxyRoute::post("/proposals"), Some(body)).await)
}

/// Forward a proposal update as sent; its shape is the backend's to check
pub async fn update_proposal(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let body = parse_json_body(&payload)?;
    if let Some(wallet) = body.get("wallet").and_then(Value::as_str) {
        tracing::info!("Updating proposal of {}", wallet);
    }

    Ok(dispatch(&req, &state, ProxyRoute::put("/proposals"), Some(body)).await)
}

/// Cast a vote. Duplicate voters are the backend's call.
pub async fn vote(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let mut vote = parse_update(&payload)?;

    if vote.update.voter_wallet.as_deref().map_or(true, |w| w.trim().is_empty()) {
        return Err(ProxyError::BadRequest("Voter wallet required".to_string()));
    }
    vote.update.action = "vote".to_string();
    vote.update.timestamp.get_or_insert_with(now);

    let body = serde_json::to_value(vote)?;
    Ok(dispatch(&req, &state, ProxyRoute::post("/proposals/vote"), Some(body)).await)
}
