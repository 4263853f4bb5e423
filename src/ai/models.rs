//! AI chat data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored chat turn, one row per completed prompt/response pair
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct AiChat {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub response: String,
    pub model: String,
    pub tokens: i64,
    pub created_at: Option<String>,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

#[derive(Deserialize, Debug)]
pub struct ChatPayload {
    pub prompt: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

#[derive(Deserialize, Debug)]
pub struct GenerateImagePayload {
    pub prompt: String,
    #[serde(default = "default_image_size")]
    pub size: String,
}

#[derive(Deserialize, Debug)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
