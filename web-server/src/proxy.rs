// web-server/src/proxy.rs
use actix_web::{http::StatusCode, web::Bytes, HttpRequest, HttpResponse, ResponseError};
use common::Config;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::admin::check_admin;
use crate::backend::{BackendRequest, BackendResponse, BackendTransport};
use crate::error::ProxyError;
use crate::token_manager::{TokenManager, TokenStore};

// Browser headers carried through to the backend
const FORWARDED_HEADERS: [&str; 3] = ["accept", "accept-language", "user-agent"];

// Retries allowed after the backend answers 401
const UNAUTHORIZED_RETRIES: u32 = 1;

/// Shared, immutable state handed to every route
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn BackendTransport>,
    pub tokens: TokenManager,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn BackendTransport>) -> Self {
        let tokens = TokenManager::new(backend.clone(), &config);
        Self {
            config,
            backend,
            tokens,
        }
    }
}

/// Where a browser route lands on the backend
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub method: Method,
    pub path: &'static str,
    pub admin_only: bool,
    pub headers: Vec<(String, String)>,
}

impl ProxyRoute {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            admin_only: false,
            headers: Vec::new(),
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: &'static str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Reject callers that fail the admin check before touching the backend
    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Parse a browser body, mapping anything that isn't JSON to a 400
pub fn parse_json_body(payload: &Bytes) -> Result<Value, ProxyError> {
    serde_json::from_slice(payload)
        .map_err(|_| ProxyError::BadRequest("Invalid JSON body".to_string()))
}

/// Forward a browser request and turn the outcome into a response.
///
/// Never fails: errors become JSON envelopes, and any change to the token
/// cookie is written on both paths.
pub async fn dispatch(
    req: &HttpRequest,
    state: &AppState,
    route: ProxyRoute,
    body: Option<Value>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "proxy",
        %request_id,
        method = %route.method,
        path = route.path
    );

    let mut store = TokenStore::from_request(req);
    let result = forward(req, state, &route, body, &mut store)
        .instrument(span)
        .await;

    let mut response = match result {
        Ok((status, value)) => {
            // the body is always JSON, so an empty backend reply still answers 200
            let status = match StatusCode::from_u16(status) {
                Ok(StatusCode::NO_CONTENT) | Err(_) => StatusCode::OK,
                Ok(status) => status,
            };
            HttpResponse::build(status).json(value)
        }
        Err(err) => {
            tracing::error!(%request_id, "{} {} failed: {}", route.method, route.path, err);
            err.error_response()
        }
    };

    store.apply(&mut response, state.tokens.secure_cookies());
    response
}

async fn forward(
    req: &HttpRequest,
    state: &AppState,
    route: &ProxyRoute,
    body: Option<Value>,
    store: &mut TokenStore,
) -> Result<(u16, Value), ProxyError> {
    if route.admin_only {
        let check = check_admin(req, &state.config.admin);
        if !check.is_admin {
            tracing::warn!("Admin access denied for wallet {}", check.wallet);
            return Err(ProxyError::Forbidden {
                wallet: check.wallet,
            });
        }
    }

    let mut request = BackendRequest::new(route.method.clone(), route.path);
    for name in FORWARDED_HEADERS {
        if let Some(value) = req.headers().get(name).and_then(|v| v.to_str().ok()) {
            request = request.header(name, value);
        }
    }
    for (name, value) in &route.headers {
        request = request.header(name.clone(), value.clone());
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = send_authorized(&state.tokens, state.backend.as_ref(), store, request).await?;
    normalize(response)
}

/// Send with a bearer token, retrying exactly once on 401 with a fresh one
pub async fn send_authorized(
    tokens: &TokenManager,
    backend: &dyn BackendTransport,
    store: &mut TokenStore,
    request: BackendRequest,
) -> Result<BackendResponse, ProxyError> {
    let mut attempt = 0;
    loop {
        let token = tokens.get_token(store).await?;
        let response = backend.send(request.clone().bearer(token)).await?;

        if response.status != StatusCode::UNAUTHORIZED.as_u16() {
            return Ok(response);
        }

        tokens.invalidate(store);
        if attempt == UNAUTHORIZED_RETRIES {
            tracing::error!("Backend rejected a freshly issued token");
            return Err(ProxyError::Auth {
                status: response.status,
                body: response.body,
            });
        }

        attempt += 1;
        tracing::warn!("Backend rejected token, retrying with a new one");
    }
}

/// Decode a backend reply; bare text is wrapped rather than rejected
pub fn normalize(response: BackendResponse) -> Result<(u16, Value), ProxyError> {
    if !response.is_success() {
        return Err(ProxyError::upstream(response.status, &response.body));
    }

    let value = match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => value,
        Err(_) => json!({
            "success": true,
            "message": response.body
        }),
    };

    Ok((response.status, value))
}
