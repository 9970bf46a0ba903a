//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Category, CategoryChanges, CategoryListItem, CategoryStatus, NewCategory, Product,
    ProductDraft, ProductRanking, ProductRow, ProductStatus, RecommendPatch, StockOperation,
    SubtreeMove,
};
use crate::service::dto::{CategoryQuery, Page, ProductQuery};

/// 分类仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Category>>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Category>>;

    /// 按 sort ASC, created_at ASC 返回全部分类
    async fn list_all(&self, status: Option<CategoryStatus>) -> Result<Vec<Category>>;
    async fn list(&self, query: &CategoryQuery) -> Result<Page<CategoryListItem>>;

    // 层级校验
    async fn sibling_name_exists(
        &self,
        parent_id: Option<i64>,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool>;
    async fn count_children(&self, id: i64) -> Result<i64>;
    /// 以 `prefix` 为 path 前缀的后代中最深的 level
    async fn deepest_descendant_level(&self, prefix: &str) -> Result<Option<i32>>;

    // 写入
    async fn create(&self, category: &NewCategory) -> Result<Category>;
    /// 更新节点，`subtree` 不为空时在同一事务内平移所有后代
    async fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
        subtree: Option<SubtreeMove>,
    ) -> Result<Option<Category>>;
    async fn update_status(
        &self,
        id: i64,
        status: CategoryStatus,
        operator: &str,
    ) -> Result<Option<Category>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// 商品仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Product>>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Product>>;
    async fn list(&self, query: &ProductQuery) -> Result<Page<ProductRow>>;
    async fn list_ranked(
        &self,
        ranking: ProductRanking,
        category_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Product>>;
    /// 同分类下在售的其它商品，按销量倒序
    async fn list_related(&self, product: &Product, limit: i64) -> Result<Vec<Product>>;

    async fn sku_exists(&self, sku: &str, exclude_id: Option<i64>) -> Result<bool>;
    async fn count_by_category(&self, category_id: i64) -> Result<i64>;

    // 单个写入
    async fn create(&self, draft: &ProductDraft, operator: &str) -> Result<Product>;
    async fn update(&self, id: i64, draft: &ProductDraft, operator: &str)
    -> Result<Option<Product>>;
    async fn update_status(&self, id: i64, status: ProductStatus) -> Result<Option<Product>>;
    async fn update_stock(
        &self,
        id: i64,
        operation: StockOperation,
        quantity: i32,
    ) -> Result<Option<Product>>;
    async fn update_recommend(&self, id: i64, patch: &RecommendPatch) -> Result<Option<Product>>;
    async fn delete(&self, id: i64) -> Result<bool>;

    // 批量写入，返回受影响行数
    async fn batch_update_status(&self, ids: &[i64], status: ProductStatus) -> Result<u64>;
    async fn batch_update_category(&self, ids: &[i64], category_id: i64) -> Result<u64>;
    /// (商品 ID, 新价格) 列表，在同一事务内更新
    async fn batch_update_prices(&self, prices: &[(i64, i64)]) -> Result<u64>;
    async fn batch_update_recommend(&self, ids: &[i64], patch: &RecommendPatch) -> Result<u64>;
    async fn batch_delete(&self, ids: &[i64]) -> Result<u64>;
}
