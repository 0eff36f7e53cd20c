use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::AttendanceRecord;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::{attendance_stats, geo, qr_code};
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Columns an admin edit may touch. The conflict key columns
/// (user_id, date) are deliberately absent.
const EDITABLE_COLUMNS: &[&str] = &[
    "check_in_time",
    "check_out_time",
    "status",
    "notes",
    "location_lat",
    "location_lng",
];

#[derive(Deserialize, ToSchema)]
pub struct ScanReq {
    #[schema(example = "VERRA_ATT-20250602-9f2c1ab00e71")]
    pub code: String,
    #[schema(example = 40.7128, nullable = true)]
    pub location_lat: Option<f64>,
    #[schema(example = -74.0060, nullable = true)]
    pub location_lng: Option<f64>,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Max records returned, newest first (default 10).
    pub limit: Option<u32>,
}

/// QR check-in/check-out. One scan either closes today's open record or
/// upserts a check-in keyed on (user_id, date).
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = ScanReq,
    responses(
        (status = 200, description = "Checked in or out", body = Object, example = json!({
            "message": "Checked in successfully", "action": "check_in"
        })),
        (status = 400, description = "Invalid code or outside geofence"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No staff profile"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn scan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ScanReq>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;

    let code = payload.code.trim();
    if code.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "QR code required"
        })));
    }

    let qr_cfg = crate::api::qr::fetch_config(pool.get_ref()).await?;
    let today = Local::now().date_naive();

    // Reject before touching any attendance row.
    if !qr_code::validate_code(code, &qr_cfg.qr_code_prefix, today, &config.qr_code_secret) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "The QR code is invalid or expired"
        })));
    }

    if qr_cfg.location_validation_enabled {
        if let (Some(lat), Some(lng), Some(center_lat), Some(center_lng)) = (
            payload.location_lat,
            payload.location_lng,
            qr_cfg.allowed_latitude,
            qr_cfg.allowed_longitude,
        ) {
            if !geo::within_geofence(
                lat,
                lng,
                center_lat,
                center_lng,
                qr_cfg.geofence_radius_meters as f64,
            ) {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "You are outside the allowed check-in area"
                })));
            }
        }
    }

    // Open record for today => this scan is a check-out.
    let open: Option<(u64,)> = sqlx::query_as(
        r#"
        SELECT id FROM attendance_records
        WHERE user_id = ? AND date = CURDATE()
        AND check_in_time IS NOT NULL AND check_out_time IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to look up today's record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some((record_id,)) = open {
        sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_out_time = NOW(), qr_code = ?
            WHERE id = ?
            "#,
        )
        .bind(code)
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id, record_id, "Check-out failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked out successfully",
            "action": "check_out"
        })));
    }

    let status = attendance_stats::status_for_check_in(
        Local::now().time(),
        qr_cfg.work_start_time,
        qr_cfg.late_threshold_minutes,
    );

    // The unique key on (user_id, date) makes a repeated check-in an
    // update of the same row, never a duplicate.
    sqlx::query(
        r#"
        INSERT INTO attendance_records
            (user_id, date, check_in_time, status, qr_code, location_lat, location_lng)
        VALUES (?, CURDATE(), NOW(), ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            check_in_time = VALUES(check_in_time),
            status = VALUES(status),
            qr_code = VALUES(qr_code),
            location_lat = VALUES(location_lat),
            location_lng = VALUES(location_lng)
        "#,
    )
    .bind(user_id)
    .bind(status.to_string())
    .bind(code)
    .bind(payload.location_lat)
    .bind(payload.location_lng)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Check-in failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "action": "check_in",
        "status": status.to_string()
    })))
}

/// Own recent records, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recent attendance records", body = [AttendanceRecord]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status,
               location_lat, location_lng, qr_code, notes, created_at
        FROM attendance_records
        WHERE user_id = ?
        ORDER BY date DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch attendance history");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// Today's own record, if any.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's record", body = AttendanceRecord),
        (status = 404, description = "No record for today"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;

    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status,
               location_lat, location_lng, qr_code, notes, created_at
        FROM attendance_records
        WHERE user_id = ? AND date = CURDATE()
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch today's record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(r) => Ok(HttpResponse::Ok().json(r)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No attendance record for today"
        }))),
    }
}

/// Manager/admin field edit.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{record_id}",
    params(("record_id", description = "Attendance record ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Record updated"),
        (status = 400, description = "Unknown field"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let record_id = path.into_inner();

    let update = build_update_sql("attendance_records", EDITABLE_COLUMNS, &body, "id", record_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, record_id, "Failed to update attendance record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record updated successfully"
    })))
}

/// Manager/admin delete.
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{record_id}",
    params(("record_id", description = "Attendance record ID")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let record_id = path.into_inner();

    let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, record_id, "Failed to delete attendance record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record deleted successfully"
    })))
}
