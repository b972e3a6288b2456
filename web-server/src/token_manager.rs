// web-server/src/token_manager.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use common::{redact, Config, LoginRequest, LoginResponse, ServiceCredentials, TOKEN_TTL_SECONDS};
use reqwest::Method;
use std::sync::Arc;

use crate::backend::{BackendRequest, BackendTransport};
use crate::error::ProxyError;

// Cookie holding the backend bearer token
pub const AUTH_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieUpdate {
    Set(String),
    Clear,
}

/// The token cookie as seen by a single request.
///
/// Reads come from the incoming cookie; writes are staged and land on the
/// outgoing response through [`TokenStore::apply`].
#[derive(Debug, Default)]
pub struct TokenStore {
    token: Option<String>,
    update: Option<CookieUpdate>,
}

impl TokenStore {
    pub fn from_request(req: &HttpRequest) -> Self {
        let token = req
            .cookie(AUTH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        Self { token, update: None }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set(&mut self, token: String) {
        self.token = Some(token.clone());
        self.update = Some(CookieUpdate::Set(token));
    }

    fn clear(&mut self) {
        self.token = None;
        self.update = Some(CookieUpdate::Clear);
    }

    /// Write the staged cookie change, if any, onto `response`
    pub fn apply(&self, response: &mut HttpResponse, secure: bool) {
        let cookie = match &self.update {
            Some(CookieUpdate::Set(token)) => token_cookie(token, secure),
            Some(CookieUpdate::Clear) => Cookie::build(AUTH_COOKIE_NAME, "")
                .path("/")
                .max_age(CookieDuration::seconds(0))
                .finish(),
            None => return,
        };

        if let Err(e) = response.add_cookie(&cookie) {
            tracing::error!("Failed to set token cookie: {}", e);
        }
    }
}

fn token_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE_NAME, token.to_string())
        .path("/")
        .secure(secure)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(TOKEN_TTL_SECONDS))
        .finish()
}

/// Obtains the service bearer token, logging in when the cookie has none
pub struct TokenManager {
    backend: Arc<dyn BackendTransport>,
    credentials: ServiceCredentials,
    secure_cookies: bool,
}

impl TokenManager {
    pub fn new(backend: Arc<dyn BackendTransport>, config: &Config) -> Self {
        Self {
            backend,
            credentials: config.credentials.clone(),
            secure_cookies: config.production,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Token from the cookie, or a fresh one from `/login`
    pub async fn get_token(&self, store: &mut TokenStore) -> Result<String, ProxyError> {
        if let Some(token) = store.token() {
            tracing::debug!("Using existing token {}", redact(token));
            return Ok(token.to_string());
        }

        let token = self.login().await?;
        store.set(token.clone());
        tracing::info!("New token generated and stored");

        Ok(token)
    }

    /// Forget the cached token after the backend rejected it
    pub fn invalidate(&self, store: &mut TokenStore) {
        tracing::info!("Clearing rejected backend token");
        store.clear();
    }

    async fn login(&self) -> Result<String, ProxyError> {
        let (user, password) = self.credentials.pair().ok_or_else(|| {
            tracing::error!("API_USER / API_PASSWORD are not configured");
            ProxyError::Configuration("API credentials not configured".to_string())
        })?;

        let body = serde_json::to_value(LoginRequest {
            user: user.to_string(),
            password: password.to_string(),
        })?;

        let response = self
            .backend
            .send(BackendRequest::new(Method::POST, "/login").json(body))
            .await?;

        if !response.is_success() {
            tracing::warn!("Backend login failed: {} - {}", response.status, response.body);
            return Err(ProxyError::Auth {
                status: response.status,
                body: response.body,
            });
        }

        let reply: LoginResponse =
            serde_json::from_str(&response.body).map_err(|e| ProxyError::Auth {
                status: response.status,
                body: format!("Invalid login reply: {}", e),
            })?;

        reply
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ProxyError::Auth {
                status: response.status,
                body: "No token received from login".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::ScriptedBackend;
    use actix_web::test::TestRequest;

    fn config_with_credentials() -> Config {
        let mut config = Config::default();
        config.credentials.user = Some("svc".to_string());
        config.credentials.password = Some("secret".to_string());
        config
    }

    #[actix_web::test]
    async fn test_existing_cookie_skips_login() {
        let backend = ScriptedBackend::new(&[]);
        let manager = TokenManager::new(backend.clone(), &config_with_credentials());

        let req = TestRequest::default()
            .cookie(Cookie::new(AUTH_COOKIE_NAME, "cached"))
            .to_http_request();
        let mut store = TokenStore::from_request(&req);

        assert_eq!(manager.get_token(&mut store).await.unwrap(), "cached");
        assert!(backend.requests().is_empty());
    }

    #[actix_web::test]
    async fn test_missing_cookie_logs_in_once() {
        let backend = ScriptedBackend::new(&[(200, r#"{"message":"ok","token":"fresh"}"#)]);
        let manager = TokenManager::new(backend.clone(), &config_with_credentials());
        let mut store = TokenStore::default();

        assert_eq!(manager.get_token(&mut store).await.unwrap(), "fresh");
        // second call reuses the staged token
        assert_eq!(manager.get_token(&mut store).await.unwrap(), "fresh");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/login");
        assert_eq!(requests[0].method, Method::POST);
        assert!(requests[0].bearer.is_none());
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"user": "svc", "password": "secret"}))
        );
    }

    #[actix_web::test]
    async fn test_new_token_is_written_as_strict_http_only_cookie() {
        let backend = ScriptedBackend::new(&[(200, r#"{"token":"fresh"}"#)]);
        let mut config = config_with_credentials();
        config.production = true;
        let manager = TokenManager::new(backend, &config);
        let mut store = TokenStore::default();
        manager.get_token(&mut store).await.unwrap();

        let mut response = HttpResponse::Ok().finish();
        store.apply(&mut response, manager.secure_cookies());

        let cookie = response
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .expect("token cookie");
        assert_eq!(cookie.value(), "fresh");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(3600)));
    }

    #[actix_web::test]
    async fn test_missing_credentials_is_configuration_error() {
        let backend = ScriptedBackend::new(&[]);
        let manager = TokenManager::new(backend.clone(), &Config::default());
        let mut store = TokenStore::default();

        let err = manager.get_token(&mut store).await.unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(ref m) if m == "API credentials not configured"));
        assert!(backend.requests().is_empty());
    }

    #[actix_web::test]
    async fn test_login_failure_carries_status_and_body() {
        let backend = ScriptedBackend::new(&[(500, "bad creds")]);
        let manager = TokenManager::new(backend, &config_with_credentials());
        let mut store = TokenStore::default();

        match manager.get_token(&mut store).await {
            Err(ProxyError::Auth { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "bad creds");
            }
            other => panic!("expected auth error, got {:?}", other),
        }
        assert!(store.token().is_none());
    }

    #[actix_web::test]
    async fn test_login_reply_without_token_is_auth_error() {
        let backend = ScriptedBackend::new(&[(200, r#"{"message":"User validated: svc"}"#)]);
        let manager = TokenManager::new(backend, &config_with_credentials());
        let mut store = TokenStore::default();

        assert!(matches!(
            manager.get_token(&mut store).await,
            Err(ProxyError::Auth { .. })
        ));
    }

    #[test]
    fn test_invalidate_stages_cookie_removal() {
        let backend = ScriptedBackend::new(&[]);
        let manager = TokenManager::new(backend, &config_with_credentials());
        let req = TestRequest::default()
            .cookie(Cookie::new(AUTH_COOKIE_NAME, "stale"))
            .to_http_request();
        let mut store = TokenStore::from_request(&req);

        manager.invalidate(&mut store);
        assert!(store.token().is_none());

        let mut response = HttpResponse::Ok().finish();
        store.apply(&mut response, false);
        let cookie = response.cookies().next().expect("removal cookie");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(0)));
    }
}
