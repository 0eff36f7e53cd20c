use crate::auth::auth::AuthUser;
use crate::events;
use crate::model::notification::Notification;
use actix_web::web::Bytes;
use actix_web::{HttpResponse, Responder, web};
use futures_util::StreamExt;
use serde::Deserialize;
use sqlx::MySqlPool;
use tokio_stream::wrappers::BroadcastStream;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Filter by read state; omitted returns everything.
    pub is_read: Option<bool>,
    /// Max rows returned, newest first (default 50).
    pub limit: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateNotification {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Schedule change")]
    pub title: String,
    #[schema(example = "Your Friday shift now starts at 10:00.")]
    pub message: String,
    /// One of: info, success, warning, error, system.
    #[serde(rename = "type")]
    #[schema(example = "info", nullable = true)]
    pub kind: Option<String>,
}

const ALLOWED_KINDS: &[&str] = &["info", "success", "warning", "error", "system"];

/// Own notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let mut sql = String::from(
        "SELECT id, user_id, title, message, `type`, is_read, created_at \
         FROM notifications WHERE user_id = ?",
    );
    if query.is_read.is_some() {
        sql.push_str(" AND is_read = ?");
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ?");

    let mut q = sqlx::query_as::<_, Notification>(&sql).bind(user_id);
    if let Some(is_read) = query.is_read {
        q = q.bind(is_read);
    }

    let rows = q
        .bind(limit as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to fetch notifications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Manager/admin push to a single recipient.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created"),
        (status = 400, description = "Validation failed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn create(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateNotification>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    if payload.title.trim().is_empty() || payload.message.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Title and message are required"
        })));
    }

    if let Some(kind) = &payload.kind {
        if !ALLOWED_KINDS.contains(&kind.as_str()) {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Unknown notification type"
            })));
        }
    }

    let result = sqlx::query(
        "INSERT INTO notifications (user_id, title, message, `type`) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.user_id)
    .bind(payload.title.trim())
    .bind(payload.message.trim())
    .bind(payload.kind.as_deref().unwrap_or("info"))
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, recipient = payload.user_id, "Failed to create notification");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    events::publish(payload.user_id, "insert");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Notification created",
        "id": result.last_insert_id()
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id", description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;
    let id = path.into_inner();

    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, id, "Failed to mark notification read");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Notification not found"
        })));
    }

    events::publish(user_id, "update");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Notification marked as read" })))
}

/// Single statement over the whole unread set.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All marked read"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;

    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE")
            .bind(user_id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id, "Failed to mark all notifications read");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if result.rows_affected() > 0 {
        events::publish(user_id, "update");
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "All notifications marked as read",
        "updated": result.rows_affected()
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id", description = "Notification ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn delete(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete notification");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Notification not found"
        })));
    }

    events::publish(user_id, "delete");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Notification deleted" })))
}

/// Change feed as server-sent events. Each event names only the action;
/// the client re-fetches the list, so whichever fetch lands last wins.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/stream",
    responses(
        (status = 200, description = "text/event-stream of change events"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn stream(auth: AuthUser) -> actix_web::Result<impl Responder> {
    let user_id = auth.require_profile()?;

    let feed = BroadcastStream::new(events::subscribe()).filter_map(move |event| {
        let frame = match event {
            Ok(ev) if ev.user_id == user_id => Some(Ok::<_, actix_web::Error>(Bytes::from(
                format!("event: {}\ndata: {{\"action\":\"{}\"}}\n\n", ev.action, ev.action),
            ))),
            // Lagged receivers just miss events; the client re-fetches anyway.
            _ => None,
        };
        futures_util::future::ready(frame)
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(feed))
}
