// web-server/src/admin.rs
use actix_web::HttpRequest;
use common::AdminConfig;
use serde::Serialize;

/// Header the front end sends with the connected wallet
pub const WALLET_HEADER: &str = "x-user-wallet";
/// Cookie set by the wallet provider integration
pub const WALLET_COOKIE: &str = "user-wallet";

/// Result of an admin check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheck {
    pub is_admin: bool,
    pub wallet: String,
}

impl AdminCheck {
    fn denied(wallet: &str) -> Self {
        Self {
            is_admin: false,
            wallet: wallet.to_string(),
        }
    }
}

/// Caller's wallet from the header, falling back to the cookie
pub fn caller_wallet(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(WALLET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.cookie(WALLET_COOKIE).map(|c| c.value().to_string()))
        .map(|wallet| wallet.trim().to_string())
        .filter(|wallet| !wallet.is_empty())
}

/// Compare the caller's wallet against the configured admin wallets.
///
/// Fails closed: no admin configured or no caller wallet means not an admin.
pub fn check_admin(req: &HttpRequest, admin: &AdminConfig) -> AdminCheck {
    let admins = admin.admin_wallets();
    if admins.is_empty() {
        tracing::error!("No admin wallet configured");
        return AdminCheck::denied("ADMIN_WALLET_NOT_CONFIGURED");
    }

    let wallet = match caller_wallet(req) {
        Some(wallet) => wallet,
        None => return AdminCheck::denied("NO_WALLET_PROVIDED"),
    };

    let lowered = wallet.to_lowercase();
    AdminCheck {
        is_admin: admins.iter().any(|admin| *admin == lowered),
        wallet,
    }
}
