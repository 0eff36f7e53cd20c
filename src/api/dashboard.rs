use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::AttendanceRecord;
use crate::utils::attendance_stats::{DashboardSummary, summarize_today};
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use sqlx::MySqlPool;
use tracing::error;

/// Same-day aggregates for the admin landing page. Always computed from
/// scratch; an open record contributes hours up to now.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Today's aggregates", body = DashboardSummary),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status,
               location_lat, location_lng, qr_code, notes, created_at
        FROM attendance_records
        WHERE date = CURDATE()
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch today's records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let active_profiles = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_profiles WHERE is_active = TRUE",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count active profiles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let summary = summarize_today(
        &records,
        active_profiles.max(0) as u32,
        Local::now().naive_local(),
        config.regular_hourly_rate,
        config.overtime_hourly_rate,
    );

    Ok(HttpResponse::Ok().json(summary))
}
