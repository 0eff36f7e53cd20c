use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "sarah@company.com", format = "email")]
    pub email: String,
    pub password: String,
    #[schema(example = "Sarah Johnson")]
    pub full_name: String,
    #[schema(example = "EMP-017")]
    pub employee_code: String,
    #[schema(example = "Bar", nullable = true)]
    pub department: Option<String>,
    #[schema(example = "Shift Lead", nullable = true)]
    pub position: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "sarah@company.com", format = "email")]
    pub email: String,
    pub password: String,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    pub profile_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String, // email
    pub role: u8,    // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this account is linked to a staff profile
    pub profile_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
