//! Marketing data models: contacts, waitlist, analytics events, site content

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Contact {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: Option<String>,
}

#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct WaitlistEntry {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
}

#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct AnalyticsEvent {
    pub id: String,
    pub user_id: Option<String>,
    pub event: String,
    pub page: Option<String>,
    pub metadata: Option<String>,
    pub created_at: Option<String>,
}

/// Site content row. The column is `sort_order` because ORDER is reserved in
/// SQL; the API keeps the original `order` field name.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub is_active: bool,
    pub metadata: Option<String>,
    pub created_at: Option<String>,
}

/// Request payloads

#[derive(Deserialize, Debug)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub struct WaitlistPayload {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TrackEventPayload {
    pub event: String,
    pub page: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
}
