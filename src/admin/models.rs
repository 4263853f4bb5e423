//! Admin payloads and list query types

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Page/limit pair clamped to sane bounds; page is 1-based.
    pub fn pagination(&self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, 100);
        let offset = (page - 1) * limit;
        (page, limit, offset)
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateContactStatusPayload {
    pub status: String,
}

#[derive(Deserialize, Debug)]
pub struct CreateContentPayload {
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub order: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateContentPayload {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub order: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let query = ListQuery {
            page: None,
            limit: None,
            search: None,
            status: None,
        };
        assert_eq!(query.pagination(20), (1, 20, 0));
    }

    #[test]
    fn test_pagination_clamps() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(1000),
            search: None,
            status: None,
        };
        let (page, limit, offset) = query.pagination(20);
        assert_eq!(page, 1);
        assert_eq!(limit, 100);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_pagination_offset() {
        let query = ListQuery {
            page: Some(3),
            limit: Some(10),
            search: None,
            status: None,
        };
        assert_eq!(query.pagination(20), (3, 10, 20));
    }
}
