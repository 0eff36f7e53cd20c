use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "Late check-in")]
    pub title: String,

    #[schema(example = "You checked in 22 minutes after shift start.")]
    pub message: String,

    /// One of: info, success, warning, error, system.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    #[schema(example = "warning", nullable = true)]
    pub kind: Option<String>,

    #[schema(example = false)]
    pub is_read: bool,

    #[schema(example = "2025-06-02T09:25:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
