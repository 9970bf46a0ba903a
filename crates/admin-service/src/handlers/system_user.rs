//! 管理员账号 HTTP 处理器
//!
//! 密码以 bcrypt 哈希存储，任何响应都不返回密码字段

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use validator::Validate;

use crate::auth::{Claims, hash_password};
use crate::dto::request::{trimmed, trimmed_opt};
use crate::dto::{ApiResponse, PageResponse, PaginationParams};
use crate::error::{AdminError, Result};
use crate::state::AppState;

// ============================================
// 请求/响应 DTO
// ============================================

/// 创建管理员请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 20, message = "用户名长度必须在2-20个字符之间"))]
    #[serde(deserialize_with = "trimmed")]
    pub username: String,
    #[validate(length(min = 6, max = 100, message = "密码长度必须在6-100个字符之间"))]
    pub password: String,
    #[validate(length(max = 50, message = "昵称不能超过50个字符"))]
    pub nickname: Option<String>,
    #[validate(length(max = 200, message = "头像地址不能超过200个字符"))]
    pub avatar: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "手机号不能超过20个字符"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50, message = "角色名称长度必须在1-50个字符之间"))]
    pub role: Option<String>,
}

/// 更新管理员请求，未提供的字段保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 20, message = "用户名长度必须在2-20个字符之间"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub username: Option<String>,
    #[validate(length(min = 6, max = 100, message = "密码长度必须在6-100个字符之间"))]
    pub password: Option<String>,
    #[validate(length(max = 50, message = "昵称不能超过50个字符"))]
    pub nickname: Option<String>,
    #[validate(length(max = 200, message = "头像地址不能超过200个字符"))]
    pub avatar: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "手机号不能超过20个字符"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50, message = "角色名称长度必须在1-50个字符之间"))]
    pub role: Option<String>,
    #[validate(range(min = 0, max = 1, message = "状态只能是0或1"))]
    pub status: Option<i16>,
}

/// 列表过滤条件
#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    /// 用户名或昵称模糊匹配
    pub keyword: Option<String>,
}

/// 管理员 DTO（不含密码）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub status: i16,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updateTime")]
    pub updated_at: DateTime<Utc>,
}

// ============================================
// 数据库模型
// ============================================

#[derive(Debug, FromRow)]
pub struct AdminUserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUserRow {
    pub fn is_enabled(&self) -> bool {
        self.status == 1
    }
}

impl From<AdminUserRow> for UserDto {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            nickname: row.nickname,
            avatar: row.avatar,
            email: row.email,
            phone: row.phone,
            role: row.role,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub const USER_COLUMNS: &str = "id, username, password_hash, nickname, avatar, email, \
     phone, role, status, created_at, updated_at";

const DUPLICATE_USERNAME: &str = "用户名已存在";

async fn find_user(state: &AppState, id: i64) -> Result<AdminUserRow> {
    let sql = format!("SELECT {} FROM admin_users WHERE id = $1", USER_COLUMNS);
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AdminError::NotFound("用户不存在".to_string()))
}

async fn username_taken(state: &AppState, username: &str, exclude_id: Option<i64>) -> Result<bool> {
    let (taken,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM admin_users
            WHERE username = $1 AND ($2::bigint IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(username)
    .bind(exclude_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(taken)
}

// ============================================
// API 处理器
// ============================================

/// 管理员列表
///
/// GET /api/admin/system/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<ApiResponse<PageResponse<UserDto>>>> {
    let (page, size) = pagination.normalized();
    let keyword = filter
        .keyword
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM admin_users
        WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%' OR nickname ILIKE '%' || $1 || '%')
        "#,
    )
    .bind(&keyword)
    .fetch_one(&state.pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {} FROM admin_users
        WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%' OR nickname ILIKE '%' || $1 || '%')
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
        USER_COLUMNS
    );
    let rows: Vec<AdminUserRow> = sqlx::query_as(&sql)
        .bind(&keyword)
        .bind(size)
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    let list = rows.into_iter().map(UserDto::from).collect();
    Ok(Json(ApiResponse::success(PageResponse::new(
        list, total, page, size,
    ))))
}

/// 管理员详情
///
/// GET /api/admin/system/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserDto>>> {
    let user = find_user(&state, id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// 创建管理员
///
/// POST /api/admin/system/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;

    let username = req.username;
    if username_taken(&state, &username, None).await? {
        return Err(AdminError::Validation(DUPLICATE_USERNAME.to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let sql = format!(
        r#"
        INSERT INTO admin_users (username, password_hash, nickname, avatar, email, phone, role)
        VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'admin'))
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let user: AdminUserRow = sqlx::query_as(&sql)
        .bind(&username)
        .bind(&password_hash)
        .bind(&req.nickname)
        .bind(&req.avatar)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.role)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_USERNAME))?;

    info!(user_id = user.id, username = %user.username, "Admin user created");
    Ok(Json(ApiResponse::success_with_message(
        user.into(),
        "创建用户成功",
    )))
}

/// 更新管理员
///
/// PUT /api/admin/system/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;
    find_user(&state, id).await?;

    let username = req.username.as_deref();
    if let Some(name) = username {
        if username_taken(&state, name, Some(id)).await? {
            return Err(AdminError::Validation(DUPLICATE_USERNAME.to_string()));
        }
    }

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;

    let sql = format!(
        r#"
        UPDATE admin_users SET
            username = COALESCE($2, username),
            password_hash = COALESCE($3, password_hash),
            nickname = COALESCE($4, nickname),
            avatar = COALESCE($5, avatar),
            email = COALESCE($6, email),
            phone = COALESCE($7, phone),
            role = COALESCE($8, role),
            status = COALESCE($9, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let user: AdminUserRow = sqlx::query_as(&sql)
        .bind(id)
        .bind(username)
        .bind(&password_hash)
        .bind(&req.nickname)
        .bind(&req.avatar)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.role)
        .bind(req.status)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_USERNAME))?
        .ok_or_else(|| AdminError::NotFound("用户不存在".to_string()))?;

    info!(user_id = id, password_changed = password_hash.is_some(), "Admin user updated");
    Ok(Json(ApiResponse::success_with_message(
        user.into(),
        "更新用户成功",
    )))
}

/// 删除管理员，不允许删除当前登录账号
///
/// DELETE /api/admin/system/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if claims.user_id() == Some(id) {
        return Err(AdminError::Validation("不能删除当前登录用户".to_string()));
    }

    let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound("用户不存在".to_string()));
    }

    info!(user_id = id, "Admin user deleted");
    Ok(Json(ApiResponse::success_empty("删除用户成功")))
}
