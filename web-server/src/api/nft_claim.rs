// web-server/src/api/nft_claim.rs
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::ProxyError;
use crate::proxy::{dispatch, parse_json_body, AppState, ProxyRoute};

// Header naming the wallet whose claim status is requested
const WALLET_HEADER: &str = "wallet";

pub async fn claim_status(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ProxyError> {
    let wallet = req
        .headers()
        .get(WALLET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .ok_or_else(|| ProxyError::BadRequest("Wallet address required".to_string()))?
        .to_string();

    let route = ProxyRoute::get("/nft-claim").header(WALLET_HEADER, wallet);
    Ok(dispatch(&req, &state, route, None).await)
}

/// Submit a claim; eligibility and the one-claim rule live in the backend
pub async fn submit_claim(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    let body = parse_json_body(&payload)?;
    Ok(dispatch(&req, &state, ProxyRoute::post("/nft-claim"), Some(body)).await)
}
