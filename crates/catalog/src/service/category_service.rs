//! 分类服务
//!
//! 负责分类的增删改查。层级规则由 `hierarchy` 模块计算，这里负责：
//! - 取父分类、校验同级重名
//! - 改挂父分类时计算子树平移并交给仓储在事务内落库
//! - 删除前检查子分类与商品引用

use std::sync::Arc;

use tracing::{info, instrument};

use mall_shared::observability::metrics::record_category_change;

use crate::error::{CatalogError, Result};
use crate::hierarchy::{self, Placement};
use crate::models::{
    Category, CategoryChanges, CategoryDetail, CategoryListItem, CategoryNode, CategoryOption,
    CategoryStatus, NewCategory,
};
use crate::repository::{
    CategoryRepository, CategoryRepositoryTrait, ProductRepository, ProductRepositoryTrait,
};
use crate::service::dto::{CategoryInput, CategoryQuery, Page};

/// 分类名称最大长度（字符）
const MAX_NAME_CHARS: usize = 50;

/// 分类服务
pub struct CategoryService<CR = CategoryRepository, PR = ProductRepository>
where
    CR: CategoryRepositoryTrait,
    PR: ProductRepositoryTrait,
{
    category_repo: Arc<CR>,
    product_repo: Arc<PR>,
}

impl<CR, PR> CategoryService<CR, PR>
where
    CR: CategoryRepositoryTrait,
    PR: ProductRepositoryTrait,
{
    pub fn new(category_repo: Arc<CR>, product_repo: Arc<PR>) -> Self {
        Self {
            category_repo,
            product_repo,
        }
    }

    /// 创建分类
    #[instrument(skip(self, input), fields(name = %input.name, parent_id = ?input.parent_id))]
    pub async fn create(&self, input: CategoryInput, operator: &str) -> Result<Category> {
        let name = normalize_name(&input.name)?;
        let status = match input.status {
            Some(code) => CategoryStatus::try_from(code)?,
            None => CategoryStatus::Enabled,
        };

        let placement = self.resolve_parent(input.parent_id).await?;

        if self
            .category_repo
            .sibling_name_exists(placement.parent_id, &name, None)
            .await?
        {
            return Err(CatalogError::DuplicateSiblingName(name));
        }

        let category = self
            .category_repo
            .create(&NewCategory {
                name,
                parent_id: placement.parent_id,
                sort: input.sort.max(0),
                status,
                description: input.description,
                icon: input.icon,
                level: placement.level,
                path: placement.path,
                created_by: operator.to_string(),
            })
            .await?;

        record_category_change("create", "ok");
        info!(
            category_id = category.id,
            level = category.level,
            path = %category.path,
            "Category created"
        );
        Ok(category)
    }

    /// 分页查询
    pub async fn list(&self, query: &CategoryQuery) -> Result<Page<CategoryListItem>> {
        self.category_repo.list(query).await
    }

    /// 分类树
    pub async fn tree(&self, status: Option<CategoryStatus>) -> Result<Vec<CategoryNode>> {
        let categories = self.category_repo.list_all(status).await?;
        Ok(hierarchy::build_tree(categories))
    }

    /// 下拉选项
    pub async fn options(
        &self,
        status: CategoryStatus,
        max_level: Option<i32>,
    ) -> Result<Vec<CategoryOption>> {
        let tree = self.tree(Some(status)).await?;
        Ok(hierarchy::flatten_options(&tree, max_level))
    }

    /// 分类详情
    pub async fn detail(&self, id: i64) -> Result<CategoryDetail> {
        let category = self
            .category_repo
            .get(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        let ancestors = self
            .category_repo
            .get_many(&hierarchy::path_ids(&category.path))
            .await?;
        let parent_name = category
            .parent_id
            .and_then(|pid| ancestors.iter().find(|a| a.id == pid))
            .map(|parent| parent.name.clone());
        let path_names = hierarchy::path_names(&category, &ancestors);

        Ok(CategoryDetail {
            category,
            parent_name,
            path_names,
        })
    }

    /// 从根到自身的名称链
    pub async fn path_names(&self, category: &Category) -> Result<Vec<String>> {
        let ancestor_ids = hierarchy::path_ids(&category.path);
        let ancestors = self.category_repo.get_many(&ancestor_ids).await?;
        Ok(hierarchy::path_names(category, &ancestors))
    }

    /// 更新分类
    ///
    /// 父分类变化时校验自引用、环路和深度，并同步平移整个子树。
    #[instrument(skip(self, input), fields(name = %input.name, parent_id = ?input.parent_id))]
    pub async fn update(&self, id: i64, input: CategoryInput, operator: &str) -> Result<Category> {
        let current = self
            .category_repo
            .get(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        let name = normalize_name(&input.name)?;
        let status = match input.status {
            Some(code) => CategoryStatus::try_from(code)?,
            None => current.status,
        };

        let placement = if input.parent_id == current.parent_id {
            Placement {
                parent_id: current.parent_id,
                level: current.level,
                path: current.path.clone(),
            }
        } else {
            if input.parent_id == Some(id) {
                return Err(CatalogError::SelfParent);
            }
            self.resolve_reparent(&current, input.parent_id).await?
        };

        let subtree = if placement.path == current.path {
            None
        } else {
            let prefix = hierarchy::child_path(&current.path, current.id);
            let deepest = self.category_repo.deepest_descendant_level(&prefix).await?;
            hierarchy::plan_subtree_move(&current, &placement, deepest)?
        };

        if self
            .category_repo
            .sibling_name_exists(placement.parent_id, &name, Some(id))
            .await?
        {
            return Err(CatalogError::DuplicateSiblingName(name));
        }

        let moved = subtree.is_some();
        let updated = self
            .category_repo
            .update(
                id,
                &CategoryChanges {
                    name,
                    parent_id: placement.parent_id,
                    sort: input.sort.max(0),
                    status,
                    description: input.description,
                    icon: input.icon,
                    level: placement.level,
                    path: placement.path,
                    updated_by: operator.to_string(),
                },
                subtree,
            )
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        record_category_change(if moved { "move" } else { "update" }, "ok");
        info!(category_id = id, moved, path = %updated.path, "Category updated");
        Ok(updated)
    }

    /// 启用/禁用分类
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: i16, operator: &str) -> Result<Category> {
        let status = CategoryStatus::try_from(status)?;
        let updated = self
            .category_repo
            .update_status(id, status, operator)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        info!(category_id = id, status = ?status, "Category status updated");
        Ok(updated)
    }

    /// 删除分类
    ///
    /// 存在子分类或仍被商品引用时拒绝。
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.category_repo
            .get(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        if self.category_repo.count_children(id).await? > 0 {
            record_category_change("delete", "has_children");
            return Err(CatalogError::HasChildren(id));
        }

        let products = self.product_repo.count_by_category(id).await?;
        if products > 0 {
            record_category_change("delete", "in_use");
            return Err(CatalogError::CategoryInUse { id, products });
        }

        if !self.category_repo.delete(id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }

        record_category_change("delete", "ok");
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    /// 解析新建时的父分类位置
    async fn resolve_parent(&self, parent_id: Option<i64>) -> Result<Placement> {
        let Some(parent_id) = parent_id else {
            return Ok(Placement::root());
        };
        let parent = self
            .category_repo
            .get(parent_id)
            .await?
            .ok_or(CatalogError::ParentNotFound(parent_id))?;
        hierarchy::place_under(Some(&parent))
    }

    /// 解析改挂后的父分类位置，额外校验环路
    async fn resolve_reparent(&self, node: &Category, parent_id: Option<i64>) -> Result<Placement> {
        let Some(parent_id) = parent_id else {
            return Ok(Placement::root());
        };
        let parent = self
            .category_repo
            .get(parent_id)
            .await?
            .ok_or(CatalogError::ParentNotFound(parent_id))?;
        hierarchy::check_reparent(node.id, &parent)?;
        hierarchy::place_under(Some(&parent))
    }
}

/// 去除首尾空白并校验名称
fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation("分类名称不能为空".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(CatalogError::Validation(
            "分类名称不能超过50个字符".to_string(),
        ));
    }
    Ok(name.to_string())
}
