//! 资源（菜单、接口等）管理 HTTP 处理器

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

#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 50, message = "资源名称长度必须在1-50个字符之间"))]
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(max = 20, message = "资源类型不能超过20个字符"))]
    pub resource_type: Option<String>,
    #[validate(length(max = 200, message = "资源地址不能超过200个字符"))]
    pub url: Option<String>,
    #[validate(length(max = 200, message = "资源描述不能超过200个字符"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 50, message = "资源名称长度必须在1-50个字符之间"))]
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 20, message = "资源类型不能超过20个字符"))]
    pub resource_type: Option<String>,
    #[validate(length(max = 200, message = "资源地址不能超过200个字符"))]
    pub url: Option<String>,
    #[validate(length(max = 200, message = "资源描述不能超过200个字符"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResourceDto {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
}

const RESOURCE_COLUMNS: &str = "id, name, resource_type, url, description, created_at";

const DUPLICATE_RESOURCE: &str = "资源名称已存在";

/// GET /api/admin/system/resources
pub async fn list_resources(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ResourceDto>>>> {
    let sql = format!("SELECT {} FROM resources ORDER BY id", RESOURCE_COLUMNS);
    let resources: Vec<ResourceDto> = sqlx::query_as(&sql).fetch_all(&state.pool).await?;
    Ok(Json(ApiResponse::success(resources)))
}

/// POST /api/admin/system/resources
pub async fn create_resource(
    State(state): State<AppState>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceDto>>> {
    req.validate()?;

    let sql = format!(
        r#"
        INSERT INTO resources (name, resource_type, url, description)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        RESOURCE_COLUMNS
    );
    let resource: ResourceDto = sqlx::query_as(&sql)
        .bind(&req.name)
        .bind(&req.resource_type)
        .bind(&req.url)
        .bind(&req.description)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_RESOURCE))?;

    info!(resource_id = resource.id, name = %resource.name, "Resource created");
    Ok(Json(ApiResponse::success_with_message(
        resource,
        "创建资源成功",
    )))
}

/// PUT /api/admin/system/resources/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceDto>>> {
    req.validate()?;

    let sql = format!(
        r#"
        UPDATE resources SET
            name = COALESCE($2, name),
            resource_type = COALESCE($3, resource_type),
            url = COALESCE($4, url),
            description = COALESCE($5, description)
        WHERE id = $1
        RETURNING {}
        "#,
        RESOURCE_COLUMNS
    );
    let resource: ResourceDto = sqlx::query_as(&sql)
        .bind(id)
        .bind(req.name.as_deref())
        .bind(&req.resource_type)
        .bind(&req.url)
        .bind(&req.description)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| AdminError::conflict_or(e, DUPLICATE_RESOURCE))?
        .ok_or_else(|| AdminError::NotFound("资源不存在".to_string()))?;

    info!(resource_id = id, "Resource updated");
    Ok(Json(ApiResponse::success_with_message(
        resource,
        "更新资源成功",
    )))
}

/// DELETE /api/admin/system/resources/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let result = sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound("资源不存在".to_string()));
    }

    info!(resource_id = id, "Resource deleted");
    Ok(Json(ApiResponse::success_empty("删除资源成功")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_renamed() {
        let req: CreateResourceRequest = serde_json::from_value(serde_json::json!({
            "name": "商品菜单",
            "type": "menu",
            "url": "/products"
        }))
        .unwrap();
        assert_eq!(req.resource_type.as_deref(), Some("menu"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_resource_name_rejected() {
        let req: CreateResourceRequest =
            serde_json::from_value(serde_json::json!({"name": "  "})).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateResourceRequest =
            serde_json::from_value(serde_json::json!({"name": "   "})).unwrap();
        assert!(req.validate().is_err());
    }
}
