use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::attendance::AttendanceRecord;
use crate::model::profile::UserProfile;
use crate::utils::payroll_calc::{compute_payroll, payroll_totals};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct PayrollQuery {
    /// Month to summarize, "YYYY-MM". Defaults to the current month.
    pub month: Option<String>,
    /// Overrides the configured regular hourly rate.
    pub regular_rate: Option<f64>,
    /// Overrides the configured overtime hourly rate.
    pub overtime_rate: Option<f64>,
}

/// First and last day of a "YYYY-MM" month.
fn month_bounds(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;

    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };

    Some((first, next_month - Duration::days(1)))
}

/// Monthly payroll summary. Whole-hour arithmetic over completed
/// records; every active profile gets a line.
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Payroll lines and totals", body = Object, example = json!({
            "month": "2025-06",
            "lines": [],
            "totals": { "total_pay": 0.0, "total_hours": 0, "overtime_hours": 0, "employees": 0 }
        })),
        (status = 400, description = "Bad month format"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn monthly(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let month = match &query.month {
        Some(m) => m.clone(),
        None => chrono::Local::now().format("%Y-%m").to_string(),
    };

    let (first_day, last_day) = match month_bounds(&month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Month must be in YYYY-MM format"
            })));
        }
    };

    if [query.regular_rate, query.overtime_rate]
        .iter()
        .flatten()
        .any(|rate| *rate < 0.0)
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Hourly rates must be non-negative"
        })));
    }

    let regular_rate = query.regular_rate.unwrap_or(config.regular_hourly_rate);
    let overtime_rate = query.overtime_rate.unwrap_or(config.overtime_hourly_rate);

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, date, check_in_time, check_out_time, status,
               location_lat, location_lng, qr_code, notes, created_at
        FROM attendance_records
        WHERE date BETWEEN ? AND ?
          AND check_in_time IS NOT NULL AND check_out_time IS NOT NULL
        "#,
    )
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %month, "Failed to fetch payroll records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let profiles = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, employee_code, full_name, email, phone, department, position,
               role, is_active, created_at
        FROM user_profiles
        WHERE is_active = TRUE
        ORDER BY full_name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch active profiles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let lines = compute_payroll(&records, &profiles, regular_rate, overtime_rate);
    let totals = payroll_totals(&lines);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "month": month,
        "regular_rate": regular_rate,
        "overtime_rate": overtime_rate,
        "lines": lines,
        "totals": totals
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (first, last) = month_bounds("2025-06").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn month_bounds_handle_december_rollover() {
        let (first, last) = month_bounds("2025-12").unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn month_bounds_reject_garbage() {
        assert!(month_bounds("June 2025").is_none());
        assert!(month_bounds("2025-13").is_none());
        assert!(month_bounds("").is_none());
    }
}
