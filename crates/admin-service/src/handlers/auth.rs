//! 认证相关的 HTTP 处理器
//!
//! 登录签发 JWT，`/auth/me` 返回当前 Token 中的身份信息

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::system_user::{AdminUserRow, USER_COLUMNS, UserDto};
use crate::auth::{Claims, verify_password};
use crate::dto::ApiResponse;
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "用户名不能为空"))]
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "密码不能为空"))]
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
    pub permissions: Vec<String>,
    pub roles: Vec<String>,
    /// Token 过期时间（Unix 秒）
    pub expires_at: i64,
}

/// 用户登录
///
/// POST /api/admin/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let sql = format!("SELECT {} FROM admin_users WHERE username = $1", USER_COLUMNS);
    let user: AdminUserRow = sqlx::query_as(&sql)
        .bind(req.username.trim())
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AdminError::InvalidCredentials)?;

    check_credentials(&user, &req.password)?;

    let role_permissions: Option<(Vec<String>,)> =
        sqlx::query_as("SELECT permissions FROM roles WHERE name = $1")
            .bind(&user.role)
            .fetch_optional(&state.pool)
            .await?;
    let permissions = state.access.permissions_for(
        &user.role,
        role_permissions.map(|(p,)| p).unwrap_or_default(),
    );
    let roles = vec![user.role.clone()];

    let (token, expires_at) = state.jwt_manager.generate_token(
        user.id,
        &user.username,
        user.nickname.as_deref(),
        roles.clone(),
        permissions.clone(),
    )?;

    info!(user_id = user.id, username = %user.username, "Admin logged in");

    Ok(Json(ApiResponse::success_with_message(
        LoginResponse {
            token,
            user: user.into(),
            permissions,
            roles,
            expires_at,
        },
        "登录成功",
    )))
}

/// 校验密码与账号状态
///
/// 先比对密码，密码错误时不暴露账号是否被禁用。
fn check_credentials(user: &AdminUserRow, password: &str) -> Result<()> {
    if !verify_password(password, &user.password_hash)? {
        warn!(username = %user.username, "Login failed: wrong password");
        return Err(AdminError::InvalidCredentials);
    }
    if !user.is_enabled() {
        warn!(username = %user.username, "Login rejected: user disabled");
        return Err(AdminError::UserDisabled);
    }
    Ok(())
}

/// 当前登录用户
///
/// GET /api/admin/auth/me
pub async fn current_user(Extension(claims): Extension<Claims>) -> Json<ApiResponse<Claims>> {
    Json(ApiResponse::success(claims))
}
