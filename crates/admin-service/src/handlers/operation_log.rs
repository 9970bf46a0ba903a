//! 操作日志 API 处理器
//!
//! 写操作由审计中间件自动记录，这里提供查询、手工补录和删除。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, PageResponse, PaginationParams};
use crate::error::{AdminError, Result};
use crate::state::AppState;

/// 日志查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogFilter {
    pub user_id: Option<i64>,
    /// 操作名称模糊匹配
    pub operation: Option<String>,
}

/// 手工记录日志请求，未提供操作人时取当前登录用户
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogRequest {
    pub user_id: Option<i64>,
    #[validate(length(max = 50, message = "用户名不能超过50个字符"))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 100, message = "操作名称长度必须在1-100个字符之间"))]
    pub operation: String,
    #[validate(length(max = 200, message = "操作目标不能超过200个字符"))]
    pub target: Option<String>,
    pub detail: Option<String>,
    #[validate(length(max = 64, message = "IP地址不能超过64个字符"))]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogDto {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub operation: String,
    pub target: Option<String>,
    pub detail: Option<String>,
    pub ip: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
}

const LOG_COLUMNS: &str = "id, user_id, username, operation, target, detail, ip, created_at";

/// 查询操作日志（分页 + 过滤）
///
/// GET /api/admin/logs
#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<OperationLogFilter>,
) -> Result<Json<ApiResponse<PageResponse<OperationLogDto>>>> {
    let (page, size) = pagination.normalized();
    let operation = filter
        .operation
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let (total,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM operation_logs
        WHERE ($1::bigint IS NULL OR user_id = $1)
          AND ($2::text IS NULL OR operation ILIKE '%' || $2 || '%')
        "#,
    )
    .bind(filter.user_id)
    .bind(&operation)
    .fetch_one(&state.pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {} FROM operation_logs
        WHERE ($1::bigint IS NULL OR user_id = $1)
          AND ($2::text IS NULL OR operation ILIKE '%' || $2 || '%')
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
        LOG_COLUMNS
    );
    let logs: Vec<OperationLogDto> = sqlx::query_as(&sql)
        .bind(filter.user_id)
        .bind(&operation)
        .bind(size)
        .bind(pagination.offset())
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        logs, total, page, size,
    ))))
}

/// 手工记录日志
///
/// POST /api/admin/logs
pub async fn create_log(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLogRequest>,
) -> Result<Json<ApiResponse<OperationLogDto>>> {
    req.validate()?;

    let user_id = req.user_id.or_else(|| claims.user_id());
    let username = req.username.unwrap_or(claims.username);

    let sql = format!(
        r#"
        INSERT INTO operation_logs (user_id, username, operation, target, detail, ip)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        LOG_COLUMNS
    );
    let log: OperationLogDto = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(&username)
        .bind(req.operation.trim())
        .bind(&req.target)
        .bind(&req.detail)
        .bind(&req.ip)
        .fetch_one(&state.pool)
        .await?;

    info!(log_id = log.id, operation = %log.operation, "Operation log created");
    Ok(Json(ApiResponse::success_with_message(log, "创建日志成功")))
}

/// 删除日志
///
/// DELETE /api/admin/logs/{id}
pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let result = sqlx::query("DELETE FROM operation_logs WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound("日志不存在".to_string()));
    }

    info!(log_id = id, "Operation log deleted");
    Ok(Json(ApiResponse::success_empty("删除日志成功")))
}
