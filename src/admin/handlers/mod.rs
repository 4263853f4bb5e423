// Admin handlers, one file per console section

pub mod contacts;
pub mod content;
pub mod dashboard;
pub mod users;

pub(crate) fn pagination_json(total: i64, page: i64, limit: i64) -> serde_json::Value {
    serde_json::json!({
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": (total + limit - 1) / limit,
    })
}
