// common/src/messages.rs
use serde::{Deserialize, Serialize};

/// Body of the backend `POST /login` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

/// Reply to `POST /login`; the backend also sends a human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Chat line typed by a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub author: String,
}

/// Browser body for `/api/interactive`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveRequest {
    pub data: ChatMessage,
}

/// Post sent to the backend's narrative endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPost {
    pub post_type: String,
    pub data: ChatMessage,
}

impl ChatPost {
    pub fn message(data: ChatMessage) -> Self {
        Self {
            post_type: "message".to_string(),
            data,
        }
    }
}
