use crate::auth::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::model::qr_config::QrAttendanceConfig;
use crate::utils::qr_code;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// Loads the singleton config row. Every QR operation depends on it, so
/// a missing row is a server error rather than a 404.
pub async fn fetch_config(pool: &MySqlPool) -> actix_web::Result<QrAttendanceConfig> {
    sqlx::query_as::<_, QrAttendanceConfig>(
        r#"
        SELECT id, organization_name, qr_code_prefix, work_start_time, work_end_time,
               late_threshold_minutes, location_validation_enabled,
               allowed_latitude, allowed_longitude, geofence_radius_meters,
               access_pin, updated_at
        FROM qr_attendance_config
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch QR config");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .ok_or_else(|| {
        error!("QR attendance config row is missing");
        actix_web::error::ErrorInternalServerError("QR configuration not initialized")
    })
}

#[derive(Deserialize, ToSchema)]
pub struct ValidateReq {
    #[schema(example = "VERRA_ATT-20250602-9f2c1ab00e71")]
    pub code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyPinReq {
    #[schema(example = "4821")]
    pub pin: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SetPinReq {
    pub pin: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateQrConfig {
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
}

/// `get_daily_qr_code`: today's code, derived from the configured
/// prefix and the server secret.
#[utoipa::path(
    post,
    path = "/api/v1/qr/daily",
    responses(
        (status = 200, description = "Today's attendance code", body = Object, example = json!({
            "code": "VERRA_ATT-20250602-9f2c1ab00e71", "date": "2025-06-02"
        })),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn daily(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let qr_cfg = fetch_config(pool.get_ref()).await?;
    let today = Local::now().date_naive();

    let code =
        qr_code::daily_code_cached(&qr_cfg.qr_code_prefix, today, &config.qr_code_secret).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "code": code,
        "date": today
    })))
}

/// `validate_qr_attendance_code(code) -> bool`.
#[utoipa::path(
    post,
    path = "/api/v1/qr/validate",
    request_body = ValidateReq,
    responses(
        (status = 200, description = "Validation result", body = Object, example = json!({
            "valid": true
        })),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn validate(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ValidateReq>,
) -> actix_web::Result<impl Responder> {
    let qr_cfg = fetch_config(pool.get_ref()).await?;
    let today = Local::now().date_naive();

    let valid = qr_code::validate_code(
        payload.code.trim(),
        &qr_cfg.qr_code_prefix,
        today,
        &config.qr_code_secret,
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({ "valid": valid })))
}

/// `verify_qr_access_pin(pin) -> bool`. An unset PIN never verifies.
#[utoipa::path(
    post,
    path = "/api/v1/qr/access/verify",
    request_body = VerifyPinReq,
    responses(
        (status = 200, description = "Verification result", body = Object, example = json!({
            "valid": false
        })),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn verify_access_pin(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<VerifyPinReq>,
) -> actix_web::Result<impl Responder> {
    let qr_cfg = fetch_config(pool.get_ref()).await?;

    let valid = match &qr_cfg.access_pin {
        Some(hash) => verify_password(&payload.pin, hash).is_ok(),
        None => false,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "valid": valid })))
}

/// Admin-only PIN rotation.
#[utoipa::path(
    put,
    path = "/api/v1/qr/access/pin",
    request_body = SetPinReq,
    responses(
        (status = 200, description = "PIN updated"),
        (status = 400, description = "PIN too short"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn set_access_pin(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SetPinReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.pin.trim().len() < 4 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "PIN must be at least 4 characters"
        })));
    }

    let qr_cfg = fetch_config(pool.get_ref()).await?;
    let hash = hash_password(payload.pin.trim());

    sqlx::query("UPDATE qr_attendance_config SET access_pin = ?, updated_at = NOW() WHERE id = ?")
        .bind(&hash)
        .bind(qr_cfg.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update access PIN");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Access PIN updated successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/qr/config",
    responses(
        (status = 200, description = "Current configuration", body = QrAttendanceConfig),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn get_config(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let qr_cfg = fetch_config(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(qr_cfg))
}

/// Manager/admin config update with numeric-range validation.
#[utoipa::path(
    put,
    path = "/api/v1/qr/config",
    request_body = UpdateQrConfig,
    responses(
        (status = 200, description = "Configuration updated"),
        (status = 400, description = "Validation failed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn update_config(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateQrConfig>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    if payload.organization_name.trim().is_empty() || payload.qr_code_prefix.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Organization name and QR prefix are required"
        })));
    }

    if payload.late_threshold_minutes > 60 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Late threshold must be between 0 and 60 minutes"
        })));
    }

    if !(10..=1000).contains(&payload.geofence_radius_meters) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Geofence radius must be between 10 and 1000 meters"
        })));
    }

    if payload.location_validation_enabled
        && (payload.allowed_latitude.is_none() || payload.allowed_longitude.is_none())
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Location validation requires a geofence center"
        })));
    }

    let qr_cfg = fetch_config(pool.get_ref()).await?;

    sqlx::query(
        r#"
        UPDATE qr_attendance_config
        SET organization_name = ?, qr_code_prefix = ?, work_start_time = ?, work_end_time = ?,
            late_threshold_minutes = ?, location_validation_enabled = ?,
            allowed_latitude = ?, allowed_longitude = ?, geofence_radius_meters = ?,
            updated_at = NOW()
        WHERE id = ?
        "#,
    )
    .bind(payload.organization_name.trim())
    .bind(payload.qr_code_prefix.trim())
    .bind(payload.work_start_time)
    .bind(payload.work_end_time)
    .bind(payload.late_threshold_minutes)
    .bind(payload.location_validation_enabled)
    .bind(payload.allowed_latitude)
    .bind(payload.allowed_longitude)
    .bind(payload.geofence_radius_meters)
    .bind(qr_cfg.id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to update QR config");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "QR configuration updated successfully"
    })))
}
