//! 权限点管理 HTTP 处理器

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

/// 创建权限请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, max = 50, message = "权限名称长度必须在1-50个字符之间"))]
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "权限编码长度必须在1-100个字符之间"))]
    #[serde(deserialize_with = "trimmed")]
    pub code: String,
    #[validate(length(max = 200, message = "权限描述不能超过200个字符"))]
    pub description: Option<String>,
}

/// 更新权限请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 50, message = "权限名称长度必须在1-50个字符之间"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "权限编码长度必须在1-100个字符之间"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub code: Option<String>,
    #[validate(length(max = 200, message = "权限描述不能超过200个字符"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PermissionDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
}

const DUPLICATE_PERMISSION: &str = "权限名称或编码已存在";

/// GET /api/admin/system/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PermissionDto>>>> {
    let permissions: Vec<PermissionDto> = sqlx::query_as(
        "SELECT id, name, code, description, created_at FROM permissions ORDER BY code",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(ApiResponse::success(permissions)))
}

/// POST /api/admin/system/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<Json<ApiResponse<PermissionDto>>> {
    req.validate()?;

    let permission: PermissionDto = sqlx::query_as(
        r#"
        INSERT INTO permissions (name, code, description)
        VALUES ($1, $2, $3)
        RETURNING id, name, code, description, created_at
        "#,
    )
    .bind(&req.name)
    .bind(&req.code)
    .bind(&req.description)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AdminError::conflict_or(e, DUPLICATE_PERMISSION))?;

    info!(permission_id = permission.id, code = %permission.code, "Permission created");
    Ok(Json(ApiResponse::success_with_message(
        permission,
        "创建权限成功",
    )))
}

/// PUT /api/admin/system/permissions/{id}
pub async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePermissionRequest>,
) -> Result<Json<ApiResponse<PermissionDto>>> {
    req.validate()?;

    let permission: PermissionDto = sqlx::query_as(
        r#"
        UPDATE permissions SET
            name = COALESCE($2, name),
            code = COALESCE($3, code),
            description = COALESCE($4, description)
        WHERE id = $1
        RETURNING id, name, code, description, created_at
        "#,
    )
    .bind(id)
    .bind(req.name.as_deref())
    .bind(req.code.as_deref())
    .bind(&req.description)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| AdminError::conflict_or(e, DUPLICATE_PERMISSION))?
    .ok_or_else(|| AdminError::NotFound("权限不存在".to_string()))?;

    info!(permission_id = id, "Permission updated");
    Ok(Json(ApiResponse::success_with_message(
        permission,
        "更新权限成功",
    )))
}

/// DELETE /api/admin/system/permissions/{id}
pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound("权限不存在".to_string()));
    }

    info!(permission_id = id, "Permission deleted");
    Ok(Json(ApiResponse::success_empty("删除权限成功")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_permission_fields_rejected() {
        let req: CreatePermissionRequest = serde_json::from_value(serde_json::json!({
            "name": "商品查看",
            "code": "   "
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: UpdatePermissionRequest =
            serde_json::from_value(serde_json::json!({"name": " "})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_permission_fields_are_trimmed() {
        let req: CreatePermissionRequest = serde_json::from_value(serde_json::json!({
            "name": " 商品查看 ",
            "code": " catalog:product:read\n"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.name, "商品查看");
        assert_eq!(req.code, "catalog:product:read");

        let req: UpdatePermissionRequest =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.name.is_none());
        assert!(req.code.is_none());
    }
}
