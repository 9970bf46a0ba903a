//! 商品仓储
//!
//! 提供商品的数据访问，批量操作按 ID 列表执行

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use super::like_pattern;
use super::traits::ProductRepositoryTrait;
use crate::error::{CatalogError, Result};
use crate::models::{
    MAX_STOCK, Product, ProductDraft, ProductRanking, ProductRow, ProductStatus, RecommendPatch,
    StockOperation,
};
use crate::service::dto::{Page, ProductQuery, normalize_page};

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.category_id, p.sku, p.price, p.original_price, p.cost, p.stock, p.sales,
    p.description, p.images, p.status, p.sort, p.tags, p.specifications,
    p.seo_title, p.seo_keywords, p.seo_description, p.weight, p.dimensions, p.brand, p.model,
    p.is_recommended, p.is_hot, p.is_featured, p.is_new,
    p.created_by, p.updated_by, p.created_at, p.updated_at
"#;

/// 列表查询的过滤条件，计数与分页查询共用
const LIST_FILTER: &str = r#"
    WHERE ($1::text IS NULL
           OR p.name ILIKE $1 OR p.sku ILIKE $1 OR p.description ILIKE $1
           OR p.brand ILIKE $1 OR p.model ILIKE $1
           OR EXISTS (SELECT 1 FROM unnest(p.tags) AS tag WHERE tag ILIKE $1))
      AND ($2::bigint IS NULL OR p.category_id = $2)
      AND ($3::smallint IS NULL OR p.status = $3)
      AND ($4::bigint IS NULL OR p.price >= $4)
      AND ($5::bigint IS NULL OR p.price <= $5)
      AND ($6::text IS NULL OR p.brand ILIKE $6)
      AND ($7::boolean IS NULL OR ($7 AND p.stock > 0) OR (NOT $7 AND p.stock <= 0))
"#;

/// 商品仓储
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn get(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products p WHERE p.id = $1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM products p WHERE p.id = ANY($1) ORDER BY p.id",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn list(&self, query: &ProductQuery) -> Result<Page<ProductRow>> {
        let (_, size, offset) = normalize_page(query.page, query.size);
        let keyword = query.keyword.as_deref().map(like_pattern);
        let brand = query.brand.as_deref().map(like_pattern);

        let count_sql = format!("SELECT COUNT(*) FROM products p {}", LIST_FILTER);
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&keyword)
            .bind(query.category_id)
            .bind(query.status)
            .bind(query.min_price)
            .bind(query.max_price)
            .bind(&brand)
            .bind(query.in_stock)
            .fetch_one(&self.pool)
            .await?;

        if total.0 == 0 {
            return Ok(Page {
                items: Vec::new(),
                total: 0,
            });
        }

        let list_sql = format!(
            r#"
            SELECT {}, c.name AS category_name
            FROM products p
            LEFT JOIN product_categories c ON c.id = p.category_id
            {}
            ORDER BY {} {}, p.id DESC
            LIMIT $8 OFFSET $9
            "#,
            PRODUCT_COLUMNS,
            LIST_FILTER,
            query.order_by.column(),
            query.order.as_sql()
        );
        let items = sqlx::query_as::<_, ProductRow>(&list_sql)
            .bind(&keyword)
            .bind(query.category_id)
            .bind(query.status)
            .bind(query.min_price)
            .bind(query.max_price)
            .bind(&brand)
            .bind(query.in_stock)
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total: total.0,
        })
    }

    async fn list_ranked(
        &self,
        ranking: ProductRanking,
        category_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Product>> {
        let order = match ranking {
            ProductRanking::TopSelling => "p.sales DESC, p.created_at DESC",
            ProductRanking::NewArrivals => "p.created_at DESC",
        };
        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            WHERE p.status = $1
              AND ($2::bigint IS NULL OR p.category_id = $2)
            ORDER BY {}
            LIMIT $3
            "#,
            PRODUCT_COLUMNS, order
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(ProductStatus::OnShelf)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn list_related(&self, product: &Product, limit: i64) -> Result<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            WHERE p.category_id = $1 AND p.id <> $2 AND p.status = $3
            ORDER BY p.sales DESC, p.created_at DESC
            LIMIT $4
            "#,
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(product.category_id)
            .bind(product.id)
            .bind(ProductStatus::OnShelf)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn sku_exists(&self, sku: &str, exclude_id: Option<i64>) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM products
                WHERE sku = $1 AND ($2::bigint IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn count_by_category(&self, category_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn create(&self, draft: &ProductDraft, operator: &str) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products AS p (
                name, category_id, sku, price, original_price, cost, stock, sales,
                description, images, status, sort, tags, specifications,
                seo_title, seo_keywords, seo_description, weight, dimensions, brand, model,
                is_recommended, is_hot, is_featured, is_new, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $26)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&draft.name)
            .bind(draft.category_id)
            .bind(&draft.sku)
            .bind(draft.price)
            .bind(draft.original_price)
            .bind(draft.cost)
            .bind(draft.stock)
            .bind(draft.sales)
            .bind(&draft.description)
            .bind(&draft.images)
            .bind(draft.status)
            .bind(draft.sort)
            .bind(&draft.tags)
            .bind(&draft.specifications)
            .bind(&draft.seo_title)
            .bind(&draft.seo_keywords)
            .bind(&draft.seo_description)
            .bind(draft.weight)
            .bind(draft.dimensions.map(Json))
            .bind(&draft.brand)
            .bind(&draft.model)
            .bind(draft.flags.is_recommended)
            .bind(draft.flags.is_hot)
            .bind(draft.flags.is_featured)
            .bind(draft.flags.is_new)
            .bind(operator)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CatalogError::from_unique_violation(e, || {
                    CatalogError::DuplicateSku(draft.sku.clone().unwrap_or_default())
                })
            })?;

        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        draft: &ProductDraft,
        operator: &str,
    ) -> Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products AS p
            SET name = $2, category_id = $3, sku = $4, price = $5, original_price = $6,
                cost = $7, stock = $8, sales = $9, description = $10, images = $11,
                status = $12, sort = $13, tags = $14, specifications = $15,
                seo_title = $16, seo_keywords = $17, seo_description = $18,
                weight = $19, dimensions = $20, brand = $21, model = $22,
                is_recommended = $23, is_hot = $24, is_featured = $25, is_new = $26,
                updated_by = $27, updated_at = NOW()
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(draft.category_id)
            .bind(&draft.sku)
            .bind(draft.price)
            .bind(draft.original_price)
            .bind(draft.cost)
            .bind(draft.stock)
            .bind(draft.sales)
            .bind(&draft.description)
            .bind(&draft.images)
            .bind(draft.status)
            .bind(draft.sort)
            .bind(&draft.tags)
            .bind(&draft.specifications)
            .bind(&draft.seo_title)
            .bind(&draft.seo_keywords)
            .bind(&draft.seo_description)
            .bind(draft.weight)
            .bind(draft.dimensions.map(Json))
            .bind(&draft.brand)
            .bind(&draft.model)
            .bind(draft.flags.is_recommended)
            .bind(draft.flags.is_hot)
            .bind(draft.flags.is_featured)
            .bind(draft.flags.is_new)
            .bind(operator)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                CatalogError::from_unique_violation(e, || {
                    CatalogError::DuplicateSku(draft.sku.clone().unwrap_or_default())
                })
            })?;

        Ok(product)
    }

    async fn update_status(&self, id: i64, status: ProductStatus) -> Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products AS p
            SET status = $2, updated_at = NOW()
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update_stock(
        &self,
        id: i64,
        operation: StockOperation,
        quantity: i32,
    ) -> Result<Option<Product>> {
        // 在 SQL 中计算，避免读改写之间的并发覆盖
        let sql = format!(
            r#"
            UPDATE products AS p
            SET stock = CASE $3
                    WHEN 'add' THEN LEAST(p.stock::bigint + $2, $4)::int
                    WHEN 'reduce' THEN GREATEST(p.stock - $2, 0)
                    ELSE $2
                END,
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(quantity)
            .bind(operation.as_str())
            .bind(i64::from(MAX_STOCK))
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update_recommend(&self, id: i64, patch: &RecommendPatch) -> Result<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products AS p
            SET is_recommended = COALESCE($2, p.is_recommended),
                is_hot = COALESCE($3, p.is_hot),
                is_featured = COALESCE($4, p.is_featured),
                is_new = COALESCE($5, p.is_new),
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(patch.is_recommended)
            .bind(patch.is_hot)
            .bind(patch.is_featured)
            .bind(patch.is_new)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn batch_update_status(&self, ids: &[i64], status: ProductStatus) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn batch_update_category(&self, ids: &[i64], category_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET category_id = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn batch_update_prices(&self, prices: &[(i64, i64)]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut modified = 0;

        for (id, price) in prices {
            let result =
                sqlx::query("UPDATE products SET price = $2, updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .bind(price)
                    .execute(&mut *tx)
                    .await?;
            modified += result.rows_affected();
        }

        tx.commit().await?;
        Ok(modified)
    }

    async fn batch_update_recommend(&self, ids: &[i64], patch: &RecommendPatch) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_recommended = COALESCE($2, is_recommended),
                is_hot = COALESCE($3, is_hot),
                is_featured = COALESCE($4, is_featured),
                is_new = COALESCE($5, is_new),
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(patch.is_recommended)
        .bind(patch.is_hot)
        .bind(patch.is_featured)
        .bind(patch.is_new)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
