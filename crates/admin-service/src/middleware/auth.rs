//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将 Claims 注入请求扩展。
//! 缺少 Token 返回 401，Token 无效或过期返回 403。

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AdminError;
use crate::state::AppState;

/// 任意方法均公开的路由
const PUBLIC_PATHS: &[&str] = &["/api/admin/auth/login", "/health", "/ready"];

/// 仅 GET 公开的路由前缀（分类查询）
const PUBLIC_READ_PREFIX: &str = "/api/admin/categories";

/// 认证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let token = match bearer_token(&request) {
        Some(token) => token.to_string(),
        None => return AdminError::Unauthorized("未提供token".to_string()).into_response(),
    };

    match state.jwt_manager.verify_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// 判断请求是否无需认证
pub fn is_public(method: &Method, path: &str) -> bool {
    if PUBLIC_PATHS.contains(&path) {
        return true;
    }
    *method == Method::GET
        && path
            .strip_prefix(PUBLIC_READ_PREFIX)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
