use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Daily attendance status. Stored as a lowercase string column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

/// One row per (user, date); the unique key on (user_id, date) is what
/// guarantees a second check-in upserts rather than duplicates.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2025-06-02T09:02:00", value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(example = "2025-06-02T18:10:00", value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    #[schema(example = "present", nullable = true)]
    pub status: Option<String>,

    #[schema(example = 40.7128, nullable = true)]
    pub location_lat: Option<f64>,

    #[schema(example = -74.0060, nullable = true)]
    pub location_lng: Option<f64>,

    #[schema(example = "VERRA_ATT-20250602-9f2c1ab00e71", nullable = true)]
    pub qr_code: Option<String>,

    #[schema(nullable = true)]
    pub notes: Option<String>,

    #[schema(example = "2025-06-02T09:02:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
