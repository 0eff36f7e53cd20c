use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Singleton organization settings for QR attendance and the geofence.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct QrAttendanceConfig {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Verra Bar & Kitchen")]
    pub organization_name: String,

    #[schema(example = "VERRA_ATT")]
    pub qr_code_prefix: String,

    #[schema(example = "09:00:00", value_type = String, format = "time", nullable = true)]
    pub work_start_time: Option<NaiveTime>,

    #[schema(example = "17:00:00", value_type = String, format = "time", nullable = true)]
    pub work_end_time: Option<NaiveTime>,

    #[schema(example = 15)]
    pub late_threshold_minutes: u32,

    #[schema(example = true)]
    pub location_validation_enabled: bool,

    #[schema(example = 40.7128, nullable = true)]
    pub allowed_latitude: Option<f64>,

    #[schema(example = -74.0060, nullable = true)]
    pub allowed_longitude: Option<f64>,

    #[schema(example = 100)]
    pub geofence_radius_meters: u32,

    /// Argon2 hash of the kiosk access PIN. Never serialized.
    #[serde(skip_serializing)]
    #[schema(nullable = true)]
    pub access_pin: Option<String>,

    #[schema(example = "2025-06-01T00:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<DateTime<Utc>>,
}
