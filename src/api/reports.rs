use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceRecord;
use crate::utils::attendance_stats::{report_totals, status_breakdown, weekly_breakdown};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Lookback window in days (default 30, max 365).
    pub days: Option<u32>,
}

/// Attendance report over a rolling window: weekly chart buckets,
/// per-status counts and overall totals.
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Aggregated report", body = Object, example = json!({
            "days": 30,
            "weekly": [{ "week": "Jun 01", "present": 12, "late": 2, "absent": 1 }],
            "by_status": [{ "status": "present", "count": 12 }],
            "totals": { "total": 15, "present": 12, "late": 2, "absent": 1, "present_rate": 80.0 }
        })),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let days = query.days.unwrap_or(30).clamp(1, 365);

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status,
               location_lat, location_lng, qr_code, notes, created_at
        FROM attendance_records
        WHERE date >= DATE_SUB(CURDATE(), INTERVAL ? DAY)
        ORDER BY date
        "#,
    )
    .bind(days)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, days, "Failed to fetch report records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "days": days,
        "weekly": weekly_breakdown(&records),
        "by_status": status_breakdown(&records),
        "totals": report_totals(&records)
    })))
}
