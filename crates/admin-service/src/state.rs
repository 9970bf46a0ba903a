//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use mall_catalog::{CategoryRepository, CategoryService, ProductRepository, ProductService};
use sqlx::PgPool;

use crate::auth::{AccessPolicy, JwtManager};

/// Axum 应用共享状态
///
/// 系统管理类 handler 直接使用连接池，商品目录走领域服务
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_manager: Arc<JwtManager>,
    pub access: Arc<AccessPolicy>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

impl AppState {
    pub fn new(pool: PgPool, jwt_manager: JwtManager, access: AccessPolicy) -> Self {
        let category_repo = Arc::new(CategoryRepository::new(pool.clone()));
        let product_repo = Arc::new(ProductRepository::new(pool.clone()));

        Self {
            categories: Arc::new(CategoryService::new(
                category_repo.clone(),
                product_repo.clone(),
            )),
            products: Arc::new(ProductService::new(product_repo, category_repo)),
            jwt_manager: Arc::new(jwt_manager),
            access: Arc::new(access),
            pool,
        }
    }
}
