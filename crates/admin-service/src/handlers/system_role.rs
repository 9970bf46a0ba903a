//! 角色管理 HTTP 处理器
//!
//! 角色以权限编码列表描述授权范围，系统内置角色不可删除

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use validator::Validate;

use crate::dto::ApiResponse;
use crate::dto::request::{trimmed, trimmed_opt};
use crate::error::{AdminError, Result};
use crate::state::AppState;

// ============================================
// 请求/响应 DTO
// ============================================

/// 创建角色请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "角色名称长度必须在1-50个字符之间"))]
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[validate(length(max = 200, message = "角色描述不能超过200个字符"))]
    pub description: Option<String>,
    /// 权限编码列表
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// 更新角色请求，未提供的字段保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "角色名称长度必须在1-50个字符之间"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "角色描述不能超过200个字符"))]
    pub description: Option<String>,
    /// 提供时整体替换
    pub permissions: Option<Vec<String>>,
}

/// 角色 DTO
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub is_system: bool,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updateTime")]
    pub updated_at: DateTime<Utc>,
}

const ROLE_COLUMNS: &str = "id, name, description, permissions, is_system, created_at, updated_at";

const DUPLICATE_ROLE: &str = "角色名已存在";

fn role_not_found() -> AdminError {
    AdminError::NotFound("角色不存在".to_string())
}

/// 去掉空白编码并去重，保持原有顺序
fn normalize_permissions(codes: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let code = code.trim().to_string();
        if !code.is_empty() && !result.contains(&code) {
            result.push(code);
        }
    }
    result
}

// ============================================
// API 处理器
// ============================================

/// 角色列表
///
/// GET /api/admin/system/roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<RoleDto>>>> {
    let sql = format!("SELECT {} FROM roles ORDER BY id", ROLE_COLUMNS);
    let roles: Vec<RoleDto> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(Json(ApiResponse::success(roles)))
}

/// 角色详情
///
/// GET /api/admin/system/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RoleDto>>> {
    let sql = format!("SELECT {} FROM roles WHERE id = $1", ROLE_COLUMNS);
    let role: RoleDto = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(role_not_found)?;
    Ok(Json(ApiResponse::success(role)))
}

/// 创建角色
///
/// POST /api/admin/system/roles
pub async fn create_role(
    State(state): State<AppState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<ApiResponse<RoleDto>>> {
    req.validate()?;

    let sql = format!(
        r#"
        INSERT INTO roles (name, description, permissions)
        VALUES ($1, $2, $3)
        RETURNING {}
        "#,
        ROLE_COLUMNS
    );
    let role: RoleDto = sqlx::query_as(&sql)
        .bind(&req.name)
        .bind(&req.description)
        .bind(normalize_permissions(req.permissions))
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_ROLE))?;

    info!(role_id = role.id, name = %role.name, "Role created");
    Ok(Json(ApiResponse::success_with_message(role, "创建角色成功")))
}

/// 更新角色
///
/// PUT /api/admin/system/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<RoleDto>>> {
    req.validate()?;

    let sql = format!(
        r#"
        UPDATE roles SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            permissions = COALESCE($4, permissions),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        ROLE_COLUMNS
    );
    let role: RoleDto = sqlx::query_as(&sql)
        .bind(id)
        .bind(req.name.as_deref())
        .bind(&req.description)
        .bind(req.permissions.map(normalize_permissions))
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_ROLE))?
        .ok_or_else(role_not_found)?;

    info!(role_id = id, "Role updated");
    Ok(Json(ApiResponse::success_with_message(role, "更新角色成功")))
}

/// 删除角色，系统角色返回 403
///
/// DELETE /api/admin/system/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let (is_system,): (bool,) = sqlx::query_as("SELECT is_system FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(role_not_found)?;

    if is_system {
        return Err(AdminError::Forbidden("系统角色不可删除".to_string()));
    }

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    info!(role_id = id, "Role deleted");
    Ok(Json(ApiResponse::success_empty("删除角色成功")))
}
