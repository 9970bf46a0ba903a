//! 商城管理后台服务
//!
//! 提供商品分类、商品、系统管理和操作日志的 REST API。

use axum::http::HeaderValue;
use mall_admin_service::{
    auth::{AccessPolicy, JwtManager},
    bootstrap, routes,
    state::AppState,
};
use mall_shared::{
    config::{AppConfig, ServerConfig},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "mall-admin-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        config.service_name,
        config.server_addr()
    );

    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    // 生产环境缺少 JWT 密钥时拒绝启动
    let jwt_manager = JwtManager::from_settings(&config.auth.jwt, config.is_production())?;
    let access = AccessPolicy::new(&config.auth);

    bootstrap::ensure_admin_user(db.pool(), &config.auth).await?;

    let state = AppState::new(db.pool().clone(), jwt_manager, access);

    // CORS 位于最外层，预检请求不经过认证
    let app = routes::build_router(state).layer(cors_layer(&config.server, config.is_production()));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 按配置构造 CORS 层
///
/// 未配置来源时，开发环境放开全部来源，生产环境不允许跨域。
fn cors_layer(server: &ServerConfig, production: bool) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if server.cors_origins.iter().any(|o| o == "*") {
        if production {
            warn!("cors_origins 包含 \"*\"，生产环境应配置具体域名");
        }
        return base.allow_origin(Any);
    }

    if server.cors_origins.is_empty() {
        if production {
            warn!("未配置 cors_origins，生产环境将拒绝跨域请求");
            return base;
        }
        info!("CORS allowed_origins: * (development)");
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    info!("CORS allowed_origins: {}", server.cors_origins.join(","));
    base.allow_origin(origins)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
