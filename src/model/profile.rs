use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "full_name": "Sarah Johnson",
        "email": "sarah@company.com",
        "phone": "+15550100",
        "department": "Bar",
        "position": "Shift Lead",
        "role": "employee",
        "is_active": true,
        "created_at": "2025-01-01T00:00:00Z"
    })
)]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Sarah Johnson")]
    pub full_name: String,

    #[schema(example = "sarah@company.com")]
    pub email: String,

    #[schema(example = "+15550100", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Bar", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "Shift Lead", nullable = true)]
    pub position: Option<String>,

    #[schema(example = "employee")]
    pub role: String,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(example = "2025-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
