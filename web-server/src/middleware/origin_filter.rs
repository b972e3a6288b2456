// web-server/src/middleware/origin_filter.rs
//
// Coarse filter for browser-facing API routes. The Referer header is client
// controlled, so this only keeps casual cross-site callers out; it is not an
// access control boundary.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpResponse, ResponseError,
};
use common::OriginFilterConfig;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use std::fmt;
use std::rc::Rc;
use url::Url;

/// Header carrying the static API access token
pub const API_TOKEN_HEADER: &str = "x-api-token";

// Origins accepted regardless of configuration
const LOCAL_ORIGINS: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

#[derive(Debug)]
struct OriginRejected;

impl fmt::Display for OriginRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request origin not allowed")
    }
}

impl ResponseError for OriginRejected {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::Forbidden().json(json!({
            "error": "Forbidden"
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct OriginFilter {
    paths: Vec<String>,
    public_origin: Option<String>,
    api_access_token: Option<String>,
}

impl OriginFilter {
    pub fn new(config: &OriginFilterConfig) -> Self {
        let public_origin = config.public_url.as_deref().and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url.origin().ascii_serialization()),
            Err(e) => {
                tracing::warn!("Ignoring invalid public URL {}: {}", raw, e);
                None
            }
        });

        Self {
            paths: config.protected_paths.clone(),
            public_origin,
            api_access_token: config
                .api_access_token
                .clone()
                .filter(|token| !token.is_empty()),
        }
    }

    fn protects(&self, path: &str) -> bool {
        self.paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    fn allowed_origins(&self, req: &ServiceRequest) -> Vec<String> {
        let info = req.connection_info();
        let mut origins = vec![format!("{}://{}", info.scheme(), info.host())];
        origins.extend(self.public_origin.iter().cloned());
        origins.extend(LOCAL_ORIGINS.iter().map(|o| o.to_string()));
        origins
    }

    fn is_allowed(&self, req: &ServiceRequest) -> bool {
        let header_value = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        if let (Some(expected), Some(given)) =
            (self.api_access_token.as_deref(), header_value(API_TOKEN_HEADER))
        {
            if given == expected {
                return true;
            }
        }

        match header_value(header::REFERER.as_str()) {
            Some(referer) => self
                .allowed_origins(req)
                .iter()
                .any(|origin| referer.starts_with(origin.as_str())),
            None => false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OriginFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = OriginFilterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OriginFilterMiddleware {
            service,
            filter: Rc::new(self.clone()),
        }))
    }
}

pub struct OriginFilterMiddleware<S> {
    service: S,
    filter: Rc<OriginFilter>,
}

impl<S, B> Service<ServiceRequest> for OriginFilterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.filter.protects(req.path()) && !self.filter.is_allowed(&req) {
            tracing::warn!(
                "Rejected {} {} from referer {:?}",
                req.method(),
                req.path(),
                req.headers().get(header::REFERER)
            );

            return Box::pin(async { Err(OriginRejected.into()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
