//! 管理后台错误类型定义
//!
//! 所有 handler 返回 `Result<Json<ApiResponse<T>>, AdminError>`，
//! 错误统一渲染为 `{code, message, success, data}` 响应体。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mall_catalog::CatalogError;
use serde_json::json;

/// 管理后台错误类型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    // === 认证错误 ===
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("用户名或密码错误")]
    InvalidCredentials,
    #[error("用户已被禁用")]
    UserDisabled,

    // === 请求错误 ===
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AdminError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) | Self::Forbidden(_) | Self::UserDisabled => {
                StatusCode::FORBIDDEN
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 错误码，仅用于日志
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserDisabled => "USER_DISABLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 唯一索引冲突转为校验错误，其余数据库错误原样保留
    pub fn conflict_or(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                Self::Validation(message.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务器内部错误".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务器内部错误".to_string()
            }
            other => {
                tracing::debug!(code = other.error_code(), message = %other, "Request rejected");
                other.to_string()
            }
        };

        let body = json!({
            "code": status.as_u16(),
            "message": message,
            "success": false,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for AdminError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // 取第一条字段错误的提示
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        Self::Validation(message)
    }
}

/// 从商品目录领域错误转换
impl From<CatalogError> for AdminError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Database(e) => Self::Database(e),
            CatalogError::Serialization(e) => Self::Internal(format!("JSON 处理错误: {}", e)),
            CatalogError::Internal(msg) => Self::Internal(msg),
            e if e.is_not_found() => Self::NotFound(e.to_string()),
            e => Self::Validation(e.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, AdminError>;
