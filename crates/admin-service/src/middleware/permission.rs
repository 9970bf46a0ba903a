//! 权限检查中间件
//!
//! 检查 auth 中间件注入的 Claims 是否拥有指定权限

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::{AccessPolicy, Claims};
use crate::error::AdminError;

/// 权限检查中间件工厂
///
/// ```ignore
/// get(list_users).layer(from_fn(require_permission(policy.clone(), "system:user:read")))
/// ```
pub fn require_permission(
    policy: Arc<AccessPolicy>,
    permission: &'static str,
) -> impl Fn(Request<Body>, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
+ Clone
+ Send
+ Sync
+ 'static {
    move |request: Request<Body>, next: Next| {
        let policy = policy.clone();
        Box::pin(async move { check_permission(&policy, request, next, permission).await })
    }
}

async fn check_permission(
    policy: &AccessPolicy,
    request: Request<Body>,
    next: Next,
    required: &str,
) -> Response {
    let allowed = match request.extensions().get::<Claims>() {
        Some(claims) => policy.allows(claims, required),
        None => return AdminError::Unauthorized("未认证".to_string()).into_response(),
    };

    if allowed {
        next.run(request).await
    } else {
        debug!(permission = required, "Permission denied");
        AdminError::Forbidden(format!("缺少权限: {}", required)).into_response()
    }
}
