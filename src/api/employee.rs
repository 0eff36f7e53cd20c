use crate::auth::auth::AuthUser;
use crate::model::profile::UserProfile;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Columns a manager/admin edit may touch on a profile.
const EDITABLE_COLUMNS: &[&str] = &[
    "full_name",
    "email",
    "phone",
    "department",
    "position",
    "role",
    "is_active",
];

/// The self-service subset: contact details only.
const SELF_EDITABLE_COLUMNS: &[&str] = &["full_name", "phone"];

const PROFILE_COLUMNS: &str = "id, employee_code, full_name, email, phone, department, position, \
                               role, is_active, created_at";

#[derive(Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    /// Matches name, email or employee code.
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-014")]
    pub employee_code: String,
    #[schema(example = "Mike Chen")]
    pub full_name: String,
    #[schema(example = "mike.chen@verra.example")]
    pub email: String,
    #[schema(example = "+1-555-0142", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "Kitchen", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "Line Cook", nullable = true)]
    pub position: Option<String>,
    /// One of: admin, manager, employee. Defaults to employee.
    #[schema(example = "employee", nullable = true)]
    pub role: Option<String>,
}

/// Paged staff directory with optional filters.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Page of profiles", body = Object, example = json!({
            "employees": [], "page": 1, "per_page": 20, "total": 0
        })),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions: Vec<&str> = Vec::new();
    if query.department.is_some() {
        conditions.push("department = ?");
    }
    if query.role.is_some() {
        conditions.push("role = ?");
    }
    if query.is_active.is_some() {
        conditions.push("is_active = ?");
    }
    if query.search.is_some() {
        conditions.push("(full_name LIKE ? OR email LIKE ? OR employee_code LIKE ?)");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let search_pattern = query.search.as_ref().map(|s| format!("%{}%", s.trim()));

    macro_rules! bind_filters {
        ($q:expr) => {{
            let mut q = $q;
            if let Some(d) = &query.department {
                q = q.bind(d);
            }
            if let Some(r) = &query.role {
                q = q.bind(r);
            }
            if let Some(a) = query.is_active {
                q = q.bind(a);
            }
            if let Some(p) = &search_pattern {
                q = q.bind(p).bind(p).bind(p);
            }
            q
        }};
    }

    let count_sql = format!("SELECT COUNT(*) FROM user_profiles{}", where_clause);
    let total: i64 = bind_filters!(sqlx::query_scalar(&count_sql))
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let list_sql = format!(
        "SELECT {} FROM user_profiles{} ORDER BY full_name LIMIT ? OFFSET ?",
        PROFILE_COLUMNS, where_clause
    );
    let employees = bind_filters!(sqlx::query_as::<_, UserProfile>(&list_sql))
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "employees": employees,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

/// Own profile.
#[utoipa::path(
    get,
    path = "/api/v1/employees/me",
    responses(
        (status = 200, description = "Caller's profile", body = UserProfile),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn me(auth: AuthUser, pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let profile_id = auth.require_profile()?;
    fetch_profile(pool.get_ref(), profile_id).await
}

/// Self-service edit, restricted to contact fields.
#[utoipa::path(
    put,
    path = "/api/v1/employees/me",
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Unknown field"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_me(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let profile_id = auth.require_profile()?;

    let update = build_update_sql(
        "user_profiles",
        SELF_EDITABLE_COLUMNS,
        &body,
        "id",
        profile_id as i64,
    )?;

    execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, profile_id, "Failed to update own profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Profile updated successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id", description = "Profile ID")),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "Not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    fetch_profile(pool.get_ref(), path.into_inner()).await
}

async fn fetch_profile(pool: &MySqlPool, id: u64) -> actix_web::Result<HttpResponse> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {} FROM user_profiles WHERE id = ?",
        PROFILE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        }))),
    }
}

/// Manager/admin profile creation. Account registration is separate;
/// a profile without an account can still be scheduled and paid.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Profile created"),
        (status = 400, description = "Validation failed or duplicate"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    if payload.employee_code.trim().is_empty()
        || payload.full_name.trim().is_empty()
        || payload.email.trim().is_empty()
    {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Employee code, full name and email are required"
        })));
    }

    let role = payload.role.as_deref().unwrap_or("employee");
    if !["admin", "manager", "employee"].contains(&role) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Role must be admin, manager or employee"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO user_profiles
            (employee_code, full_name, email, phone, department, position, role, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(payload.employee_code.trim())
    .bind(payload.full_name.trim())
    .bind(payload.email.trim())
    .bind(&payload.phone)
    .bind(&payload.department)
    .bind(&payload.position)
    .bind(role)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(r) => Ok(HttpResponse::Created().json(serde_json::json!({
            "message": "Employee created successfully",
            "id": r.last_insert_id()
        }))),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23000") => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Employee code or email already exists"
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Err(actix_web::error::ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Manager/admin field edit.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id", description = "Profile ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Unknown field"),
        (status = 404, description = "Not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let id = path.into_inner();
    let update = build_update_sql("user_profiles", EDITABLE_COLUMNS, &body, "id", id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, id, "Failed to update profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Employee updated successfully" })))
}

/// Deactivation rather than a row delete; attendance history stays
/// attached to the profile.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id", description = "Profile ID")),
    responses(
        (status = 200, description = "Profile deactivated"),
        (status = 404, description = "Not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn deactivate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("UPDATE user_profiles SET is_active = FALSE WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to deactivate profile");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee deactivated successfully"
    })))
}
