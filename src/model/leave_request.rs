use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Sick,
    Casual,
    Vacation,
    Maternity,
    Paternity,
    Emergency,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "2025-06-09", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2025-06-11", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "sick")]
    pub leave_type: String,

    #[schema(example = "Flu, doctor's note attached.")]
    pub reason: String,

    /// pending, approved or rejected.
    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = 1, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2025-06-05T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn leave_type_parses_snake_case() {
        assert_eq!(LeaveType::from_str("sick").unwrap(), LeaveType::Sick);
        assert_eq!(LeaveType::from_str("vacation").unwrap(), LeaveType::Vacation);
        assert!(LeaveType::from_str("sabbatical").is_err());
    }

    #[test]
    fn leave_type_displays_snake_case() {
        assert_eq!(LeaveType::Maternity.to_string(), "maternity");
    }
}
