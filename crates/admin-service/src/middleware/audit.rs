//! 审计日志中间件
//!
//! 写操作（POST/PUT/PATCH/DELETE）成功后异步写入 operation_logs 表。
//! 写入失败只记录错误日志，不影响业务响应。

use axum::{
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use tracing::{debug, error};

use crate::auth::Claims;
use crate::state::AppState;

const API_PREFIX: &str = "/api/admin/";

/// 一条待写入的操作日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub user_id: Option<i64>,
    pub username: String,
    pub operation: String,
    pub target: Option<String>,
    pub detail: Option<String>,
    pub ip: Option<String>,
}

/// 审计中间件
pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    if !is_write_method(&method) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    // 登录属于系统行为；日志接口自身不再重复记录
    if path.starts_with("/api/admin/auth/") || path.starts_with("/api/admin/logs") {
        return next.run(request).await;
    }

    let claims = request.extensions().get::<Claims>().cloned();
    let ip = extract_client_ip(&request);

    let response = next.run(request).await;

    if response.status().is_success() {
        if let Some(claims) = claims {
            let entry = AuditEntry {
                user_id: claims.user_id(),
                username: claims.username,
                operation: operation_name(&path, &method),
                target: extract_target(&path),
                detail: Some(format!("{} {}", method, path)),
                ip,
            };
            let pool = state.pool.clone();
            tokio::spawn(async move {
                write_audit_log(&pool, &entry).await;
            });
        }
    }

    response
}

fn is_write_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// 操作名称：`{模块}:{动作}`，如 `products:batch-price`、`categories:update`
///
/// 模块取 `/api/admin/` 之后的资源段（`system/users` 取 `users`），
/// 动作优先取非数字的子路由，否则按 HTTP 方法映射。
fn operation_name(path: &str, method: &Method) -> String {
    let segments = resource_segments(path);
    let module = segments.first().copied().unwrap_or("unknown");
    let sub_action = segments
        .iter()
        .skip(1)
        .rev()
        .find(|s| !is_numeric(s))
        .copied();

    let action = match sub_action {
        Some(action) => action,
        None => match *method {
            Method::POST => "create",
            Method::PUT | Method::PATCH => "update",
            Method::DELETE => "delete",
            _ => "unknown",
        },
    };
    format!("{}:{}", module, action)
}

/// 操作目标：`{资源}:{ID}`，路径中没有数字 ID 时为空
fn extract_target(path: &str) -> Option<String> {
    let segments = resource_segments(path);
    let id = segments.iter().find(|s| is_numeric(s))?;
    let resource = segments.first()?;
    Some(format!("{}:{}", resource, id))
}

fn resource_segments(path: &str) -> Vec<&str> {
    let stripped = path.strip_prefix(API_PREFIX).unwrap_or(path);
    let stripped = stripped.strip_prefix("system/").unwrap_or(stripped);
    stripped.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// 优先取反向代理设置的 X-Forwarded-For 第一段
fn extract_client_ip(request: &Request<axum::body::Body>) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// 写入操作日志
pub async fn write_audit_log(pool: &PgPool, entry: &AuditEntry) {
    let result = sqlx::query(
        r#"
        INSERT INTO operation_logs (user_id, username, operation, target, detail, ip)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.user_id)
    .bind(&entry.username)
    .bind(&entry.operation)
    .bind(&entry.target)
    .bind(&entry.detail)
    .bind(&entry.ip)
    .execute(pool)
    .await;

    match result {
        Ok(_) => debug!(
            username = %entry.username,
            operation = %entry.operation,
            "审计日志已记录"
        ),
        Err(e) => error!(
            error = %e,
            username = %entry.username,
            operation = %entry.operation,
            "审计日志写入失败"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_name() {
        assert_eq!(
            operation_name("/api/admin/categories", &Method::POST),
            "categories:create"
        );
        assert_eq!(
            operation_name("/api/admin/categories/5", &Method::PUT),
            "categories:update"
        );
        assert_eq!(
            operation_name("/api/admin/products/5/stock", &Method::PATCH),
            "products:stock"
        );
        assert_eq!(
            operation_name("/api/admin/products/batch-price", &Method::POST),
            "products:batch-price"
        );
        assert_eq!(
            operation_name("/api/admin/system/users/3", &Method::DELETE),
            "users:delete"
        );
    }

    #[test]
    fn test_extract_target() {
        assert_eq!(
            extract_target("/api/admin/products/123/status"),
            Some("products:123".to_string())
        );
        assert_eq!(
            extract_target("/api/admin/system/roles/7"),
            Some("roles:7".to_string())
        );
        assert_eq!(extract_target("/api/admin/products/batch-delete"), None);
        assert_eq!(extract_target("/api/admin/categories"), None);
    }

    #[test]
    fn test_extract_client_ip() {
        let request = Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 172.16.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), Some("10.0.0.1".to_string()));

        let request = Request::builder()
            .header("x-real-ip", "192.168.1.9")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_client_ip(&request), Some("192.168.1.9".to_string()));
    }

    #[test]
    fn test_is_write_method() {
        assert!(is_write_method(&Method::POST));
        assert!(is_write_method(&Method::PATCH));
        assert!(is_write_method(&Method::DELETE));
        assert!(!is_write_method(&Method::GET));
        assert!(!is_write_method(&Method::OPTIONS));
    }
}
