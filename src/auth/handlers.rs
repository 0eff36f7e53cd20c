use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::role::Role,
    models::{LoginReqDto, RegisterReq, TokenType, UserSql},
    utils::email_cache,
    utils::email_filter,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.to_lowercase();

    // Cuckoo filter: fast negative. If the filter has never seen the
    // email it cannot be taken.
    if !email_filter::might_exist(&email) {
        return true;
    }

    // Moka cache: fast positive.
    if email_cache::is_taken(&email).await {
        return false;
    }

    // Database fallback.
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Creates the staff profile and the login account in one transaction,
/// then updates the email filter and cache.
async fn insert_account(
    req: &RegisterReq,
    pool: &MySqlPool,
) -> Result<(), HttpResponse> {
    let email = req.email.trim().to_lowercase();
    let hashed = hash_password(&req.password);

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open registration transaction");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO user_profiles (employee_code, full_name, email, department, position, role)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.employee_code)
    .bind(&req.full_name)
    .bind(&email)
    .bind(&req.department)
    .bind(&req.position)
    .bind(Role::Employee.as_str())
    .execute(&mut *tx)
    .await;

    let profile_id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(HttpResponse::Conflict()
                        .json(json!({"error": "Employee code or email already exists"})));
                }
            }
            error!(error = %e, "Failed to create staff profile");
            return Err(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to register user"})));
        }
    };

    let result = sqlx::query(
        r#"INSERT INTO users (email, password, role_id, profile_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(Role::Employee as u8)
    .bind(profile_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = result {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return Err(
                    HttpResponse::Conflict().json(json!({"error": "Email already exists"}))
                );
            }
        }
        error!(error = %e, "Failed to create login account");
        return Err(
            HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
        );
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit registration");
        HttpResponse::InternalServerError().json(json!({"error": "Failed to register user"}))
    })?;

    email_filter::insert(&email);
    email_cache::mark_taken(&email).await;
    Ok(())
}

/// Account registration handler
pub async fn register(req: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let email = req.email.trim();

    if email.is_empty() || req.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password must not be empty"
        }));
    }

    if req.full_name.trim().is_empty() || req.employee_code.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Full name and employee code must not be empty"
        }));
    }

    if !is_email_available(email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Email already taken"
        }));
    }

    match insert_account(&req, pool.get_ref()).await {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "User registered successfully"
        })),
        Err(err_resp) => err_resp,
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching account from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, email, password, role_id, profile_id
        FROM users
        WHERE email = ? AND is_active = TRUE
        "#,
    )
    .bind(user.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "Account found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: account not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching account");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, generating tokens");

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.profile_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.profile_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // Non-fatal bookkeeping
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (record_id, record_user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // Rotate: revoke the presented token before issuing a new pair.
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.profile_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.profile_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // Only refresh tokens can log out.
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // Revoke is idempotent; success even if the token never existed.
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    HttpResponse::NoContent().finish()
}
