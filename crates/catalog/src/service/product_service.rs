//! 商品服务
//!
//! 处理商品的增删改查、库存与推荐标记调整、排行查询和批量操作。
//!
//! ## 写入校验
//!
//! 1. 名称非空 -> 2. 分类存在且启用 -> 3. 价格/数量规则 -> 4. SKU 唯一（未提供时自动生成）

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use mall_shared::observability::metrics::{record_product_change, record_sku_collision};

use crate::error::{CatalogError, Result};
use crate::hierarchy;
use crate::models::{
    Category, MAX_STOCK, PriceAdjustType, Product, ProductDraft, ProductRanking, ProductStatus,
    ProductView, RecommendFlags, RecommendPatch, StockOperation,
};
use crate::pricing::{self, PriceAdjustment};
use crate::repository::{
    CategoryRepository, CategoryRepositoryTrait, ProductRepository, ProductRepositoryTrait,
};
use crate::service::dto::{
    BatchCategoryResult, BatchDeleteResult, BatchPriceResult, BatchRecommendResult,
    BatchUpdateResult, Page, ProductInput, ProductQuery, default_flags,
};
use crate::sku;

/// 商品名称最大长度（字符）
const MAX_NAME_CHARS: usize = 100;

/// 排行类查询的最大条数
const MAX_RANKING_LIMIT: i64 = 100;

/// 商品服务
pub struct ProductService<PR = ProductRepository, CR = CategoryRepository>
where
    PR: ProductRepositoryTrait,
    CR: CategoryRepositoryTrait,
{
    product_repo: Arc<PR>,
    category_repo: Arc<CR>,
}

impl<PR, CR> ProductService<PR, CR>
where
    PR: ProductRepositoryTrait,
    CR: CategoryRepositoryTrait,
{
    pub fn new(product_repo: Arc<PR>, category_repo: Arc<CR>) -> Self {
        Self {
            product_repo,
            category_repo,
        }
    }

    // ==================== 单个商品 ====================

    /// 创建商品
    #[instrument(skip(self, input), fields(name = %input.name, category_id = input.category_id))]
    pub async fn create(&self, input: ProductInput, operator: &str) -> Result<Product> {
        self.ensure_category_available(input.category_id).await?;

        let sku = match sku::normalize(input.sku.as_deref()) {
            Some(sku) => {
                if self.product_repo.sku_exists(&sku, None).await? {
                    return Err(CatalogError::DuplicateSku(sku));
                }
                sku
            }
            None => self.generate_sku().await?,
        };

        let status = match input.status {
            Some(code) => ProductStatus::try_from(code)?,
            None => ProductStatus::OnShelf,
        };
        let flags = input.flags_or(default_flags());
        let draft = build_draft(input, Some(sku), status, flags)?;

        let product = self.product_repo.create(&draft, operator).await?;

        record_product_change("create", 1);
        info!(product_id = product.id, sku = ?product.sku, "Product created");
        Ok(product)
    }

    /// 分页查询
    pub async fn list(&self, query: &ProductQuery) -> Result<Page<ProductView>> {
        let page = self.product_repo.list(query).await?;
        Ok(Page {
            items: page.items.into_iter().map(ProductView::from).collect(),
            total: page.total,
        })
    }

    /// 商品详情，附带分类路径名称
    pub async fn detail(&self, id: i64) -> Result<ProductView> {
        let product = self.get(id).await?;

        let category = self.category_repo.get(product.category_id).await?;
        let (category_name, category_path) = match category {
            Some(category) => {
                let path = self.category_path(&category).await?;
                (Some(category.name), path)
            }
            None => (None, Vec::new()),
        };

        Ok(ProductView::new(product, category_name).with_category_path(category_path))
    }

    /// 更新商品
    ///
    /// 分类变化时重新校验分类可用性，SKU 变化时重新校验唯一性（排除自身）。
    #[instrument(skip(self, input), fields(name = %input.name, category_id = input.category_id))]
    pub async fn update(&self, id: i64, input: ProductInput, operator: &str) -> Result<Product> {
        let current = self.get(id).await?;

        if input.category_id != current.category_id {
            self.ensure_category_available(input.category_id).await?;
        }

        let sku = match sku::normalize(input.sku.as_deref()) {
            Some(sku) if current.sku.as_deref() != Some(sku.as_str()) => {
                if self.product_repo.sku_exists(&sku, Some(id)).await? {
                    return Err(CatalogError::DuplicateSku(sku));
                }
                Some(sku)
            }
            Some(sku) => Some(sku),
            None => current.sku.clone(),
        };

        let status = match input.status {
            Some(code) => ProductStatus::try_from(code)?,
            None => current.status,
        };
        let flags = input.flags_or(current.recommend_flags());
        let draft = build_draft(input, sku, status, flags)?;

        let product = self
            .product_repo
            .update(id, &draft, operator)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        record_product_change("update", 1);
        info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// 上架/下架
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: i16) -> Result<Product> {
        let status = ProductStatus::try_from(status)?;
        let product = self
            .product_repo
            .update_status(id, status)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        record_product_change("status", 1);
        info!(product_id = id, status = ?status, "Product status updated");
        Ok(product)
    }

    /// 调整库存
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        id: i64,
        operation: StockOperation,
        quantity: i32,
    ) -> Result<Product> {
        if quantity < 0 {
            return Err(CatalogError::Validation("库存数量不能为负数".to_string()));
        }
        if quantity > MAX_STOCK {
            return Err(CatalogError::Validation(format!("库存数量不能超过{}", MAX_STOCK)));
        }
        if operation == StockOperation::Add {
            let current = self
                .product_repo
                .get(id)
                .await?
                .ok_or(CatalogError::ProductNotFound(id))?;
            if operation.checked_apply(current.stock, quantity).is_none() {
                return Err(CatalogError::Validation(format!(
                    "库存数量不能超过{}",
                    MAX_STOCK
                )));
            }
        }
        let product = self
            .product_repo
            .update_stock(id, operation, quantity)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        record_product_change("stock", 1);
        info!(
            product_id = id,
            operation = operation.as_str(),
            quantity,
            stock = product.stock,
            "Product stock updated"
        );
        Ok(product)
    }

    /// 更新推荐标记，仅修改提供的字段
    #[instrument(skip(self))]
    pub async fn update_recommend(&self, id: i64, patch: RecommendPatch) -> Result<Product> {
        let product = self
            .product_repo
            .update_recommend(id, &patch)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        record_product_change("recommend", 1);
        Ok(product)
    }

    /// 删除商品
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.product_repo.delete(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        record_product_change("delete", 1);
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    // ==================== 排行 ====================

    /// 热销商品
    pub async fn top_selling(&self, category_id: Option<i64>, limit: i64) -> Result<Vec<Product>> {
        self.product_repo
            .list_ranked(ProductRanking::TopSelling, category_id, clamp_limit(limit))
            .await
    }

    /// 新品
    pub async fn new_arrivals(&self, category_id: Option<i64>, limit: i64) -> Result<Vec<Product>> {
        self.product_repo
            .list_ranked(ProductRanking::NewArrivals, category_id, clamp_limit(limit))
            .await
    }

    /// 相关商品：同分类在售商品
    pub async fn related(&self, id: i64, limit: i64) -> Result<Vec<Product>> {
        let product = self.get(id).await?;
        self.product_repo
            .list_related(&product, clamp_limit(limit))
            .await
    }

    // ==================== 批量操作 ====================

    /// 批量上架/下架
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_status(&self, ids: &[i64], status: i16) -> Result<BatchUpdateResult> {
        let ids = unique_ids(ids)?;
        let status = ProductStatus::try_from(status)?;
        let modified_count = self.product_repo.batch_update_status(&ids, status).await?;

        record_product_change("batch_status", modified_count);
        info!(modified_count, status = ?status, "Batch product status updated");
        Ok(BatchUpdateResult {
            modified_count,
            total_count: ids.len(),
        })
    }

    /// 批量修改分类
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_category(
        &self,
        ids: &[i64],
        category_id: i64,
    ) -> Result<BatchCategoryResult> {
        let ids = unique_ids(ids)?;
        let category = self.ensure_category_available(category_id).await?;
        let modified_count = self
            .product_repo
            .batch_update_category(&ids, category_id)
            .await?;

        record_product_change("batch_category", modified_count);
        info!(modified_count, category_id, "Batch product category updated");
        Ok(BatchCategoryResult {
            modified_count,
            total_count: ids.len(),
            category_name: category.name,
        })
    }

    /// 批量调价
    ///
    /// 新价格不大于 0 或超过原价的商品被跳过。
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_price(
        &self,
        ids: &[i64],
        adjust_type: PriceAdjustType,
        adjust_value: f64,
    ) -> Result<BatchPriceResult> {
        let ids = unique_ids(ids)?;
        let adjustment = PriceAdjustment::new(adjust_type, adjust_value)?;

        let products = self.product_repo.get_many(&ids).await?;
        let mut prices = Vec::with_capacity(products.len());
        for product in &products {
            let Some(new_price) = adjustment.apply(product.price) else {
                continue;
            };
            if pricing::check_original_price(new_price, product.original_price).is_err() {
                warn!(
                    product_id = product.id,
                    new_price,
                    original_price = ?product.original_price,
                    "Skip price adjustment above original price"
                );
                continue;
            }
            prices.push((product.id, new_price));
        }

        let modified_count = if prices.is_empty() {
            0
        } else {
            self.product_repo.batch_update_prices(&prices).await?
        };

        record_product_change("batch_price", modified_count);
        info!(
            modified_count,
            adjust_type = adjust_type.as_str(),
            adjust_value,
            "Batch product price updated"
        );
        Ok(BatchPriceResult {
            modified_count,
            total_count: ids.len(),
            adjust_type,
            adjust_value,
        })
    }

    /// 批量设置推荐标记
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_recommend(
        &self,
        ids: &[i64],
        patch: RecommendPatch,
    ) -> Result<BatchRecommendResult> {
        let ids = unique_ids(ids)?;
        if patch.is_empty() {
            return Err(CatalogError::Validation("请至少设置一个推荐选项".to_string()));
        }
        let modified_count = self
            .product_repo
            .batch_update_recommend(&ids, &patch)
            .await?;

        record_product_change("batch_recommend", modified_count);
        Ok(BatchRecommendResult {
            modified_count,
            total_count: ids.len(),
            operations: patch.labels().into_iter().map(str::to_string).collect(),
        })
    }

    /// 批量删除
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_delete(&self, ids: &[i64]) -> Result<BatchDeleteResult> {
        let ids = unique_ids(ids)?;
        let deleted_count = self.product_repo.batch_delete(&ids).await?;

        record_product_change("batch_delete", deleted_count);
        info!(deleted_count, "Batch products deleted");
        Ok(BatchDeleteResult {
            deleted_count,
            total_count: ids.len(),
        })
    }

    // ==================== 内部方法 ====================

    async fn get(&self, id: i64) -> Result<Product> {
        self.product_repo
            .get(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// 分类必须存在且处于启用状态
    async fn ensure_category_available(&self, category_id: i64) -> Result<Category> {
        match self.category_repo.get(category_id).await? {
            Some(category) if category.is_enabled() => Ok(category),
            _ => Err(CatalogError::CategoryUnavailable(category_id)),
        }
    }

    async fn category_path(&self, category: &Category) -> Result<Vec<String>> {
        let ancestors = self
            .category_repo
            .get_many(&hierarchy::path_ids(&category.path))
            .await?;
        Ok(hierarchy::path_names(category, &ancestors))
    }

    /// 生成未被占用的 SKU
    ///
    /// 撞号时重新生成，超过最大次数后返回最后一个候选，由唯一索引兜底。
    async fn generate_sku(&self) -> Result<String> {
        let mut candidate = sku::random_sku(Utc::now(), &mut rand::rng());
        for _ in 0..sku::MAX_SKU_ATTEMPTS {
            if !self.product_repo.sku_exists(&candidate, None).await? {
                return Ok(candidate);
            }
            record_sku_collision();
            candidate = sku::random_sku(Utc::now(), &mut rand::rng());
        }
        warn!(sku = %candidate, "SKU generation attempts exhausted");
        Ok(candidate)
    }
}

/// 组装写入数据并执行字段校验
fn build_draft(
    input: ProductInput,
    sku: Option<String>,
    status: ProductStatus,
    flags: RecommendFlags,
) -> Result<ProductDraft> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(CatalogError::Validation("商品名称不能为空".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(CatalogError::Validation(
            "商品名称不能超过100个字符".to_string(),
        ));
    }

    let draft = ProductDraft {
        name,
        category_id: input.category_id,
        sku,
        price: input.price,
        original_price: input.original_price,
        cost: input.cost,
        stock: input.stock,
        sales: input.sales,
        description: input.description,
        images: input.images,
        status,
        sort: input.sort.max(0),
        tags: input
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        specifications: input.specifications.unwrap_or_else(|| json!({})),
        seo_title: input.seo_title,
        seo_keywords: input.seo_keywords,
        seo_description: input.seo_description,
        weight: input.weight,
        dimensions: input.dimensions,
        brand: input.brand,
        model: input.model,
        flags,
    };

    pricing::validate_draft(&draft)?;
    Ok(draft)
}

/// 去重并校验非空
fn unique_ids(ids: &[i64]) -> Result<Vec<i64>> {
    let unique: BTreeSet<i64> = ids.iter().copied().collect();
    if unique.is_empty() {
        return Err(CatalogError::Validation("请选择要操作的商品".to_string()));
    }
    Ok(unique.into_iter().collect())
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_RANKING_LIMIT)
}
