//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射。权限按路由组通过 `route_layer` 挂载，
//! 认证与审计中间件作用于整个应用。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::{self, Next, from_fn},
    response::Response,
    routing::{delete, get, patch, post, put},
};
use mall_shared::database::Database;
use mall_shared::observability::middleware as obs_middleware;

use crate::auth::AccessPolicy;
use crate::handlers;
use crate::middleware::{audit_middleware, auth_middleware, require_permission};
use crate::state::AppState;

/// 认证路由：登录公开，`/auth/me` 只需有效 Token
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::current_user))
}

/// 分类路由：查询公开，写操作需要权限
fn category_routes(policy: &Arc<AccessPolicy>) -> Router<AppState> {
    use handlers::category::*;

    let public = Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/tree", get(category_tree))
        .route("/categories/options", get(category_options))
        .route("/categories/{id}", get(get_category));

    let write = Router::new()
        .route("/categories", post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/categories/{id}/status", patch(update_category_status))
        .route_layer(from_fn(require_permission(
            policy.clone(),
            "catalog:category:write",
        )));

    public.merge(write)
}

fn product_routes(policy: &Arc<AccessPolicy>) -> Router<AppState> {
    use handlers::product::*;

    let read = Router::new()
        .route("/products", get(list_products))
        .route("/products/top-selling", get(top_selling))
        .route("/products/new-products", get(new_arrivals))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/related", get(related_products))
        .route_layer(from_fn(require_permission(
            policy.clone(),
            "catalog:product:read",
        )));

    let write = Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product))
        .route("/products/{id}", delete(delete_product))
        .route("/products/{id}/status", patch(update_product_status))
        .route("/products/{id}/stock", patch(update_product_stock))
        .route("/products/{id}/recommend", patch(update_product_recommend))
        .route("/products/batch-status", post(batch_status))
        .route("/products/batch-category", post(batch_category))
        .route("/products/batch-price", post(batch_price))
        .route("/products/batch-recommend", post(batch_recommend))
        .route("/products/batch-delete", post(batch_delete))
        .route_layer(from_fn(require_permission(
            policy.clone(),
            "catalog:product:write",
        )));

    read.merge(write)
}

/// 系统管理路由：用户、角色、权限点、资源
fn system_routes(policy: &Arc<AccessPolicy>) -> Router<AppState> {
    use handlers::{system_permission, system_resource, system_role, system_user};

    let guard = |permission: &'static str| from_fn(require_permission(policy.clone(), permission));

    let users_read = Router::new()
        .route("/system/users", get(system_user::list_users))
        .route("/system/users/{id}", get(system_user::get_user))
        .route_layer(guard("system:user:read"));
    let users_write = Router::new()
        .route("/system/users", post(system_user::create_user))
        .route("/system/users/{id}", put(system_user::update_user))
        .route("/system/users/{id}", delete(system_user::delete_user))
        .route_layer(guard("system:user:write"));

    let roles_read = Router::new()
        .route("/system/roles", get(system_role::list_roles))
        .route("/system/roles/{id}", get(system_role::get_role))
        .route_layer(guard("system:role:read"));
    let roles_write = Router::new()
        .route("/system/roles", post(system_role::create_role))
        .route("/system/roles/{id}", put(system_role::update_role))
        .route("/system/roles/{id}", delete(system_role::delete_role))
        .route_layer(guard("system:role:write"));

    let permissions_read = Router::new()
        .route(
            "/system/permissions",
            get(system_permission::list_permissions),
        )
        .route_layer(guard("system:permission:read"));
    let permissions_write = Router::new()
        .route(
            "/system/permissions",
            post(system_permission::create_permission),
        )
        .route(
            "/system/permissions/{id}",
            put(system_permission::update_permission),
        )
        .route(
            "/system/permissions/{id}",
            delete(system_permission::delete_permission),
        )
        .route_layer(guard("system:permission:write"));

    let resources_read = Router::new()
        .route("/system/resources", get(system_resource::list_resources))
        .route_layer(guard("system:resource:read"));
    let resources_write = Router::new()
        .route("/system/resources", post(system_resource::create_resource))
        .route(
            "/system/resources/{id}",
            put(system_resource::update_resource),
        )
        .route(
            "/system/resources/{id}",
            delete(system_resource::delete_resource),
        )
        .route_layer(guard("system:resource:write"));

    Router::new()
        .merge(users_read)
        .merge(users_write)
        .merge(roles_read)
        .merge(roles_write)
        .merge(permissions_read)
        .merge(permissions_write)
        .merge(resources_read)
        .merge(resources_write)
}

fn log_routes(policy: &Arc<AccessPolicy>) -> Router<AppState> {
    use handlers::operation_log::*;

    let read = Router::new()
        .route("/logs", get(list_logs))
        .route_layer(from_fn(require_permission(policy.clone(), "system:log:read")));
    let write = Router::new()
        .route("/logs", post(create_log))
        .route("/logs/{id}", delete(delete_log))
        .route_layer(from_fn(require_permission(
            policy.clone(),
            "system:log:write",
        )));

    read.merge(write)
}

/// `/api/admin` 下的全部路由
pub fn api_routes(policy: Arc<AccessPolicy>) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(category_routes(&policy))
        .merge(product_routes(&policy))
        .merge(system_routes(&policy))
        .merge(log_routes(&policy))
}

/// 组装完整应用（不含 CORS，由启动流程按配置添加在最外层）
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/admin", api_routes(state.access.clone()))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // 审计位于认证之内，可读取 Claims
        .layer(middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 为所有响应注入基础安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mall-admin-service"
    }))
}

/// 就绪探针：检查数据库连接
async fn readiness_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = Database::from_pool(state.pool.clone())
        .health_check()
        .await
        .is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "mall-admin-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
