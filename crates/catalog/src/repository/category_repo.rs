//! 分类仓储
//!
//! 提供商品分类的数据访问，子树平移在单个事务内完成

use async_trait::async_trait;
use sqlx::PgPool;

use super::like_pattern;
use super::traits::CategoryRepositoryTrait;
use crate::error::{CatalogError, Result};
use crate::models::{
    Category, CategoryChanges, CategoryListItem, CategoryStatus, NewCategory, SubtreeMove,
};
use crate::service::dto::{CategoryQuery, Page, ParentFilter, normalize_page};

const CATEGORY_COLUMNS: &str = r#"
    c.id, c.name, c.parent_id, c.sort, c.status, c.description, c.icon,
    c.level, c.path, c.created_by, c.updated_by, c.created_at, c.updated_at
"#;

/// 列表查询的过滤条件，计数与分页查询共用
const LIST_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR c.name ILIKE $1 OR c.description ILIKE $1)
      AND ($2::smallint IS NULL OR c.status = $2)
      AND ($3::boolean IS NOT TRUE OR c.parent_id IS NULL)
      AND ($4::bigint IS NULL OR c.parent_id = $4)
      AND ($5::int IS NULL OR c.level = $5)
"#;

/// 分类仓储
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM product_categories c WHERE c.id = $1",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM product_categories c WHERE c.id = ANY($1) ORDER BY c.level ASC",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn list_all(&self, status: Option<CategoryStatus>) -> Result<Vec<Category>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM product_categories c
            WHERE ($1::smallint IS NULL OR c.status = $1)
            ORDER BY c.sort ASC, c.created_at ASC
            "#,
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn list(&self, query: &CategoryQuery) -> Result<Page<CategoryListItem>> {
        let (_, size, offset) = normalize_page(query.page, query.size);
        let keyword = query.keyword.as_deref().map(like_pattern);
        let (roots_only, parent_id) = match query.parent {
            ParentFilter::Any => (false, None),
            ParentFilter::Root => (true, None),
            ParentFilter::Parent(id) => (false, Some(id)),
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM product_categories c {}",
            LIST_FILTER
        );
        let total: (i64,) = sqlx::query_as(&count_sql)
            .bind(&keyword)
            .bind(query.status)
            .bind(roots_only)
            .bind(parent_id)
            .bind(query.level)
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
            SELECT {}, p.name AS parent_name
            FROM product_categories c
            LEFT JOIN product_categories p ON p.id = c.parent_id
            {}
            ORDER BY {} {}, c.created_at DESC
            LIMIT $6 OFFSET $7
            "#,
            CATEGORY_COLUMNS,
            LIST_FILTER,
            query.order_by.column(),
            query.order.as_sql()
        );
        let items = sqlx::query_as::<_, CategoryListItem>(&list_sql)
            .bind(&keyword)
            .bind(query.status)
            .bind(roots_only)
            .bind(parent_id)
            .bind(query.level)
            .bind(size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            total: total.0,
        })
    }

    async fn sibling_name_exists(
        &self,
        parent_id: Option<i64>,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM product_categories
                WHERE parent_id IS NOT DISTINCT FROM $1
                  AND name = $2
                  AND ($3::bigint IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(parent_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn count_children(&self, id: i64) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    async fn deepest_descendant_level(&self, prefix: &str) -> Result<Option<i32>> {
        let deepest: (Option<i32>,) = sqlx::query_as(
            r#"
            SELECT MAX(level)
            FROM product_categories
            WHERE path = $1 OR path LIKE $1 || '/%'
            "#,
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(deepest.0)
    }

    async fn create(&self, category: &NewCategory) -> Result<Category> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO product_categories
                (name, parent_id, sort, status, description, icon, level, path, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id, name, parent_id, sort, status, description, icon,
                      level, path, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(category.sort)
        .bind(category.status)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(category.level)
        .bind(&category.path)
        .bind(&category.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            CatalogError::from_unique_violation(e, || {
                CatalogError::DuplicateSiblingName(category.name.clone())
            })
        })?;

        Ok(created)
    }

    async fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
        subtree: Option<SubtreeMove>,
    ) -> Result<Option<Category>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE product_categories
            SET name = $2, parent_id = $3, sort = $4, status = $5, description = $6,
                icon = $7, level = $8, path = $9, updated_by = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, parent_id, sort, status, description, icon,
                      level, path, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.parent_id)
        .bind(changes.sort)
        .bind(changes.status)
        .bind(&changes.description)
        .bind(&changes.icon)
        .bind(changes.level)
        .bind(&changes.path)
        .bind(&changes.updated_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            CatalogError::from_unique_violation(e, || {
                CatalogError::DuplicateSiblingName(changes.name.clone())
            })
        })?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(subtree) = subtree {
            // 后代 path 以 old_prefix 开头，整体替换为 new_prefix
            sqlx::query(
                r#"
                UPDATE product_categories
                SET path = $2 || substring(path FROM char_length($1) + 1),
                    level = level + $3,
                    updated_at = NOW()
                WHERE path = $1 OR path LIKE $1 || '/%'
                "#,
            )
            .bind(&subtree.old_prefix)
            .bind(&subtree.new_prefix)
            .bind(subtree.level_delta)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn update_status(
        &self,
        id: i64,
        status: CategoryStatus,
        operator: &str,
    ) -> Result<Option<Category>> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE product_categories
            SET status = $2, updated_by = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, parent_id, sort, status, description, icon,
                      level, path, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(operator)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
