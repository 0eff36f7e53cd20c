use crate::auth::auth::AuthUser;
use crate::events;
use crate::model::leave_request::{LeaveRequest, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    #[schema(example = "2025-06-09", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2025-06-11", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    /// One of: sick, casual, vacation, maternity, paternity, emergency.
    #[schema(example = "sick")]
    pub leave_type: String,
    #[schema(example = "Flu, doctor's note attached.")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveQuery {
    /// pending, approved or rejected.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

const LEAVE_COLUMNS: &str =
    "id, user_id, start_date, end_date, leave_type, reason, status, approved_by, approved_at";

/// Employee files a leave request; it starts out pending.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Request filed"),
        (status = 400, description = "Validation failed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveRequest>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;

    if payload.end_date < payload.start_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "End date must not be before start date"
        })));
    }

    if LeaveType::from_str(&payload.leave_type).is_err() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Unknown leave type"
        })));
    }

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Reason is required"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests (user_id, start_date, end_date, leave_type, reason, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(user_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.leave_type)
    .bind(payload.reason.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to file leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "id": result.last_insert_id()
    })))
}

/// Employees see their own requests; managers and admins see everyone's.
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Page of leave requests", body = Object, example = json!({
            "requests": [], "page": 1, "per_page": 20, "total": 0
        })),
        (status = 400, description = "Bad status filter"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;
    let all_users = auth.require_manager_or_admin().is_ok();

    if let Some(status) = &query.status {
        if !["pending", "approved", "rejected"].contains(&status.as_str()) {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Status must be pending, approved or rejected"
            })));
        }
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions: Vec<&str> = Vec::new();
    if !all_users {
        conditions.push("user_id = ?");
    }
    if query.status.is_some() {
        conditions.push("status = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    macro_rules! bind_filters {
        ($q:expr) => {{
            let mut q = $q;
            if !all_users {
                q = q.bind(user_id);
            }
            if let Some(s) = &query.status {
                q = q.bind(s);
            }
            q
        }};
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_clause);
    let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count leave requests");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let list_sql = format!(
        "SELECT {} FROM leave_requests{} ORDER BY start_date DESC LIMIT ? OFFSET ?",
        LEAVE_COLUMNS, where_clause
    );
    let requests = bind_filters!(sqlx::query_as::<_, LeaveRequest>(&list_sql))
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave requests");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests": requests,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/approve",
    params(("id", description = "Leave request ID")),
    responses(
        (status = 200, description = "Approved"),
        (status = 404, description = "Not found or not pending"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    resolve(auth, pool, path.into_inner(), "approved").await
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/reject",
    params(("id", description = "Leave request ID")),
    responses(
        (status = 200, description = "Rejected"),
        (status = 404, description = "Not found or not pending"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    resolve(auth, pool, path.into_inner(), "rejected").await
}

/// Only a pending request can be resolved, and only once.
async fn resolve(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    id: u64,
    verdict: &'static str,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager_or_admin()?;
    let approver = auth.require_profile()?;

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, approved_by = ?, approved_at = NOW()
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(verdict)
    .bind(approver)
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, verdict, "Failed to resolve leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found or already resolved"
        })));
    }

    let requester: Option<(u64,)> = sqlx::query_as("SELECT user_id FROM leave_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .ok()
        .flatten();

    if let Some((requester_id,)) = requester {
        let title = match verdict {
            "approved" => "Leave request approved",
            _ => "Leave request rejected",
        };

        let inserted = sqlx::query(
            "INSERT INTO notifications (user_id, title, message, `type`) VALUES (?, ?, ?, ?)",
        )
        .bind(requester_id)
        .bind(title)
        .bind(format!("Your leave request #{} was {}.", id, verdict))
        .bind(if verdict == "approved" { "success" } else { "warning" })
        .execute(pool.get_ref())
        .await;

        match inserted {
            Ok(_) => events::publish(requester_id, "insert"),
            // the resolution itself succeeded; the notification is best-effort
            Err(e) => error!(error = %e, id, "Failed to notify requester"),
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave request {}", verdict)
    })))
}
