// web-server/src/backend.rs
use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde_json::Value;
use url::Url;

use crate::error::ProxyError;

/// Outbound call to the narrative backend
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and raw text of a backend reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the backend service
#[async_trait]
pub trait BackendTransport: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, ProxyError>;
}

/// `reqwest` transport rooted at the configured backend URL
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ProxyError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            ProxyError::Configuration(format!("Invalid backend URL {}: {}", base_url, e))
        })?;

        Ok(Self {
            client: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BackendTransport for HttpBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, ProxyError> {
        let url = self.url_for(&request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(BackendResponse { status, body })
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned replies in order and records every request
    #[derive(Default)]
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<BackendResponse>>,
        requests: Mutex<Vec<BackendRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: &[(u16, &str)]) -> Arc<Self> {
            let replies = replies
                .iter()
                .map(|(status, body)| BackendResponse {
                    status: *status,
                    body: body.to_string(),
                })
                .collect();

            Arc::new(Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<BackendRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.path).collect()
        }

        pub fn calls_to(&self, path: &str) -> usize {
            self.paths().iter().filter(|p| p.as_str() == path).count()
        }
    }

    #[async_trait]
    impl BackendTransport for ScriptedBackend {
        async fn send(&self, request: BackendRequest) -> Result<BackendResponse, ProxyError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProxyError::Internal("backend unreachable".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let backend = HttpBackend::new("http://localhost:8080/").unwrap();
        assert_eq!(backend.url_for("/context"), "http://localhost:8080/context");
        assert_eq!(backend.url_for("proposals/vote"), "http://localhost:8080/proposals/vote");
    }

    #[test]
    fn test_invalid_backend_url_is_a_configuration_error() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(ProxyError::Configuration(_))
        ));
    }

    #[test]
    fn test_success_range() {
        let ok = BackendResponse { status: 204, body: String::new() };
        let unauthorized = BackendResponse { status: 401, body: String::new() };
        assert!(ok.is_success());
        assert!(!unauthorized.is_success());
    }
}
