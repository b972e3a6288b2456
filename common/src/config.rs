// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

/// Lifetime of the backend bearer token cookie, in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Central configuration for the proxy, loaded once at startup
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,
    pub backend_url: String,
    /// Marks cookies `Secure`
    pub production: bool,

    pub credentials: ServiceCredentials,
    pub admin: AdminConfig,
    pub origin_filter: OriginFilterConfig,
}

/// Service account used for the backend `/login` call
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCredentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Single admin address
    pub wallet: Option<String>,
    /// Additional admin addresses
    pub wallets: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginFilterConfig {
    pub public_url: Option<String>,
    pub api_access_token: Option<String>,
    pub protected_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:3000".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            production: false,
            credentials: ServiceCredentials::default(),
            admin: AdminConfig::default(),
            origin_filter: OriginFilterConfig::default(),
        }
    }
}

impl Default for OriginFilterConfig {
    fn default() -> Self {
        Self {
            public_url: None,
            api_access_token: None,
            protected_paths: vec![
                "/api/context".to_string(),
                "/api/proposal".to_string(),
                "/api/nft-claim".to_string(),
                "/api/game-options".to_string(),
                "/api/interactive".to_string(),
            ],
        }
    }
}

impl ServiceCredentials {
    /// Both halves of the login, or `None` if either is missing or blank.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

impl AdminConfig {
    /// Every configured admin address, trimmed and lowercased.
    pub fn admin_wallets(&self) -> Vec<String> {
        self.wallet
            .iter()
            .chain(self.wallets.iter())
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// Whether a run mode turns on production behaviour. It only ever enables it.
pub fn is_production(run_mode: &str) -> bool {
    run_mode.trim().eq_ignore_ascii_case("production")
}

/// Split a comma-separated variable into its non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let mut config: Config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admin.wallets")
                    .with_list_parse_key("origin_filter.protected_paths"),
            )
            .build()?
            .try_deserialize()?;

        config.production |= is_production(&run_mode);
        Ok(config)
    }

    /// Layered configuration with the front end's plain environment variables applied on top
    pub fn from_env() -> Self {
        let mut config = match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::default()
            }
        };

        config.apply_overrides(|name| env::var(name).ok());
        config
    }

    /// Apply the deployment variables the front end has always read.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(addr) = var("WEB_SERVER_ADDR") {
            self.web_server_addr = addr;
        }

        if let Some(url) = var("BACKEND_URL").or_else(|| var("NEXT_PUBLIC_BACKEND_URL")) {
            self.backend_url = url;
        }

        if let Some(user) = var("API_USER") {
            self.credentials.user = Some(user);
        }
        if let Some(password) = var("API_PASSWORD") {
            self.credentials.password = Some(password);
        }

        if let Some(wallet) = var("NEXT_PUBLIC_ADMIN_WALLET") {
            self.admin.wallet = Some(wallet);
        }
        if let Some(wallets) = var("NEXT_PUBLIC_ADMIN_WALLETS") {
            self.admin.wallets = split_list(&wallets);
        }

        if let Some(url) = var("NEXT_PUBLIC_URL") {
            self.origin_filter.public_url = Some(url);
        }
        if let Some(token) = var("API_ACCESS_TOKEN") {
            self.origin_filter.api_access_token = Some(token);
        }
        if let Some(paths) = var("PROTECTED_PATHS") {
            self.origin_filter.protected_paths = split_list(&paths);
        }

        if let Some(mode) = var("RUN_MODE") {
            self.production |= is_production(&mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).cloned());
        config
    }

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8080");
        assert!(config.credentials.pair().is_none());
        assert!(config.admin.admin_wallets().is_empty());
        assert!(!config.production);
    }

    #[test]
    fn test_backend_url_prefers_server_variable() {
        let config = apply(&[
            ("BACKEND_URL", "http://backend:9000"),
            ("NEXT_PUBLIC_BACKEND_URL", "http://public:9000"),
        ]);
        assert_eq!(config.backend_url, "http://backend:9000");

        let config = apply(&[("NEXT_PUBLIC_BACKEND_URL", "http://public:9000")]);
        assert_eq!(config.backend_url, "http://public:9000");
    }

    #[test]
    fn test_admin_wallets_merge_single_and_list() {
        let config = apply(&[
            ("NEXT_PUBLIC_ADMIN_WALLET", "0xABC"),
            ("NEXT_PUBLIC_ADMIN_WALLETS", " 0xDef, ,0x123 "),
        ]);
        assert_eq!(config.admin.admin_wallets(), vec!["0xabc", "0xdef", "0x123"]);
    }

    #[test]
    fn test_blank_credentials_are_not_a_pair() {
        let config = apply(&[("API_USER", "svc"), ("API_PASSWORD", "  ")]);
        assert!(config.credentials.pair().is_none());

        let config = apply(&[("API_USER", "svc"), ("API_PASSWORD", "secret")]);
        assert_eq!(config.credentials.pair(), Some(("svc", "secret")));
    }

    #[test]
    fn test_run_mode_controls_secure_cookies() {
        assert!(apply(&[("RUN_MODE", "production")]).production);
        assert!(apply(&[("RUN_MODE", "Production")]).production);
        assert!(!apply(&[("RUN_MODE", "development")]).production);
    }

    #[test]
    fn test_run_mode_never_turns_off_configured_production() {
        let mut config = Config::default();
        config.production = true;
        config.apply_overrides(|name| (name == "RUN_MODE").then(|| "development".to_string()));
        assert!(config.production);
    }

    #[test]
    fn test_split_list_drops_empty_entries() {
        assert_eq!(split_list("/api/a,, /api/b ,"), vec!["/api/a", "/api/b"]);
        assert!(split_list("").is_empty());
    }
}
