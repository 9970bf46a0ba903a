//! 内存仓储
//!
//! 以内存实现仓储接口，驱动服务层完成完整的业务流程，无需数据库。

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;

use mall_catalog::dto::{CategoryQuery, Page, ParentFilter, ProductQuery, normalize_page};
use mall_catalog::{
    CatalogError, Category, CategoryChanges, CategoryListItem, CategoryRepositoryTrait,
    CategoryService, CategoryStatus, NewCategory, Product, ProductDraft, ProductRanking,
    ProductRepositoryTrait, ProductRow, ProductService, ProductStatus, RecommendPatch, Result,
    StockOperation, SubtreeMove,
};

#[derive(Default)]
struct Store {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<Store>>;

pub struct MemoryCategoryRepository(Shared);
pub struct MemoryProductRepository(Shared);

/// 共享同一份数据的分类服务与商品服务
pub struct Catalog {
    pub categories: CategoryService<MemoryCategoryRepository, MemoryProductRepository>,
    pub products: ProductService<MemoryProductRepository, MemoryCategoryRepository>,
    store: Shared,
}

impl Catalog {
    pub fn new() -> Self {
        let store: Shared = Arc::default();
        let category_repo = Arc::new(MemoryCategoryRepository(store.clone()));
        let product_repo = Arc::new(MemoryProductRepository(store.clone()));
        Self {
            categories: CategoryService::new(category_repo.clone(), product_repo.clone()),
            products: ProductService::new(product_repo, category_repo),
            store,
        }
    }

    /// 直接读取存储中的分类
    pub fn category(&self, id: i64) -> Category {
        let store = self.store.lock().unwrap();
        store
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("category exists")
    }

    pub fn product(&self, id: i64) -> Product {
        let store = self.store.lock().unwrap();
        store
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("product exists")
    }
}

fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.sort.cmp(&b.sort).then(a.created_at.cmp(&b.created_at)));
}

#[async_trait]
impl CategoryRepositoryTrait for MemoryCategoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Category>> {
        let store = self.0.lock().unwrap();
        Ok(store.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Category>> {
        let store = self.0.lock().unwrap();
        let mut found: Vec<Category> = store
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.level);
        Ok(found)
    }

    async fn list_all(&self, status: Option<CategoryStatus>) -> Result<Vec<Category>> {
        let store = self.0.lock().unwrap();
        let mut all: Vec<Category> = store
            .categories
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        sort_categories(&mut all);
        Ok(all)
    }

    async fn list(&self, query: &CategoryQuery) -> Result<Page<CategoryListItem>> {
        let store = self.0.lock().unwrap();
        let (_, size, offset) = normalize_page(query.page, query.size);
        let mut matched: Vec<Category> = store
            .categories
            .iter()
            .filter(|c| query.status.is_none_or(|s| c.status == s))
            .filter(|c| query.level.is_none_or(|l| c.level == l))
            .filter(|c| match query.parent {
                ParentFilter::Any => true,
                ParentFilter::Root => c.parent_id.is_none(),
                ParentFilter::Parent(id) => c.parent_id == Some(id),
            })
            .filter(|c| {
                query
                    .keyword
                    .as_deref()
                    .is_none_or(|k| c.name.contains(k.trim()))
            })
            .cloned()
            .collect();
        sort_categories(&mut matched);

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(offset as usize)
            .take(size as usize)
            .map(|category| {
                let parent_name = category.parent_id.and_then(|pid| {
                    store
                        .categories
                        .iter()
                        .find(|p| p.id == pid)
                        .map(|p| p.name.clone())
                });
                CategoryListItem {
                    category,
                    parent_name,
                }
            })
            .collect();
        Ok(Page { items, total })
    }

    async fn sibling_name_exists(
        &self,
        parent_id: Option<i64>,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let store = self.0.lock().unwrap();
        Ok(store.categories.iter().any(|c| {
            c.parent_id == parent_id && c.name == name && Some(c.id) != exclude_id
        }))
    }

    async fn count_children(&self, id: i64) -> Result<i64> {
        let store = self.0.lock().unwrap();
        Ok(store
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count() as i64)
    }

    async fn deepest_descendant_level(&self, prefix: &str) -> Result<Option<i32>> {
        let store = self.0.lock().unwrap();
        let probe = SubtreeMove {
            old_prefix: prefix.to_string(),
            new_prefix: prefix.to_string(),
            level_delta: 0,
        };
        Ok(store
            .categories
            .iter()
            .filter(|c| probe.covers(&c.path))
            .map(|c| c.level)
            .max())
    }

    async fn create(&self, category: &NewCategory) -> Result<Category> {
        let mut store = self.0.lock().unwrap();
        let id = store.next_id();
        let now = Utc::now();
        let created = Category {
            id,
            name: category.name.clone(),
            parent_id: category.parent_id,
            sort: category.sort,
            status: category.status,
            description: category.description.clone(),
            icon: category.icon.clone(),
            level: category.level,
            path: category.path.clone(),
            created_by: Some(category.created_by.clone()),
            updated_by: Some(category.created_by.clone()),
            created_at: now,
            updated_at: now,
        };
        store.categories.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: i64,
        changes: &CategoryChanges,
        subtree: Option<SubtreeMove>,
    ) -> Result<Option<Category>> {
        let mut store = self.0.lock().unwrap();
        let Some(index) = store.categories.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let node = &mut store.categories[index];
        node.name = changes.name.clone();
        node.parent_id = changes.parent_id;
        node.sort = changes.sort;
        node.status = changes.status;
        node.description = changes.description.clone();
        node.icon = changes.icon.clone();
        node.level = changes.level;
        node.path = changes.path.clone();
        node.updated_by = Some(changes.updated_by.clone());
        node.updated_at = Utc::now();
        let updated = node.clone();

        if let Some(subtree) = subtree {
            for category in store.categories.iter_mut() {
                if let Some((path, level)) = subtree.rebase(&category.path, category.level) {
                    category.path = path;
                    category.level = level;
                }
            }
        }
        Ok(Some(updated))
    }

    async fn update_status(
        &self,
        id: i64,
        status: CategoryStatus,
        operator: &str,
    ) -> Result<Option<Category>> {
        let mut store = self.0.lock().unwrap();
        Ok(store.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.updated_by = Some(operator.to_string());
            c.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut store = self.0.lock().unwrap();
        let before = store.categories.len();
        store.categories.retain(|c| c.id != id);
        Ok(store.categories.len() < before)
    }
}

fn product_from_draft(id: i64, draft: &ProductDraft, operator: &str) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: draft.name.clone(),
        category_id: draft.category_id,
        sku: draft.sku.clone(),
        price: draft.price,
        original_price: draft.original_price,
        cost: draft.cost,
        stock: draft.stock,
        sales: draft.sales,
        description: draft.description.clone(),
        images: draft.images.clone(),
        status: draft.status,
        sort: draft.sort,
        tags: draft.tags.clone(),
        specifications: draft.specifications.clone(),
        seo_title: draft.seo_title.clone(),
        seo_keywords: draft.seo_keywords.clone(),
        seo_description: draft.seo_description.clone(),
        weight: draft.weight,
        dimensions: draft.dimensions.map(Json),
        brand: draft.brand.clone(),
        model: draft.model.clone(),
        is_recommended: draft.flags.is_recommended,
        is_hot: draft.flags.is_hot,
        is_featured: draft.flags.is_featured,
        is_new: draft.flags.is_new,
        created_by: Some(operator.to_string()),
        updated_by: Some(operator.to_string()),
        created_at: now,
        updated_at: now,
    }
}

fn apply_patch(product: &mut Product, patch: &RecommendPatch) {
    let flags = patch.apply(product.recommend_flags());
    product.is_recommended = flags.is_recommended;
    product.is_hot = flags.is_hot;
    product.is_featured = flags.is_featured;
    product.is_new = flags.is_new;
}

#[async_trait]
impl ProductRepositoryTrait for MemoryProductRepository {
    async fn get(&self, id: i64) -> Result<Option<Product>> {
        let store = self.0.lock().unwrap();
        Ok(store.products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Product>> {
        let store = self.0.lock().unwrap();
        Ok(store
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list(&self, query: &ProductQuery) -> Result<Page<ProductRow>> {
        let store = self.0.lock().unwrap();
        let (_, size, offset) = normalize_page(query.page, query.size);
        let matched: Vec<&Product> = store
            .products
            .iter()
            .filter(|p| query.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .filter(|p| query.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| query.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| query.in_stock.is_none_or(|in_stock| (p.stock > 0) == in_stock))
            .filter(|p| {
                query
                    .keyword
                    .as_deref()
                    .is_none_or(|k| p.name.contains(k) || p.sku.as_deref() == Some(k))
            })
            .collect();

        let total = matched.len() as i64;
        let items = matched
            .into_iter()
            .skip(offset as usize)
            .take(size as usize)
            .map(|p| ProductRow {
                product: p.clone(),
                category_name: store
                    .categories
                    .iter()
                    .find(|c| c.id == p.category_id)
                    .map(|c| c.name.clone()),
            })
            .collect();
        Ok(Page { items, total })
    }

    async fn list_ranked(
        &self,
        ranking: ProductRanking,
        category_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Product>> {
        let store = self.0.lock().unwrap();
        let mut ranked: Vec<Product> = store
            .products
            .iter()
            .filter(|p| p.is_on_shelf())
            .filter(|p| category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| ranking != ProductRanking::NewArrivals || p.is_new)
            .cloned()
            .collect();
        match ranking {
            ProductRanking::TopSelling => ranked.sort_by(|a, b| b.sales.cmp(&a.sales)),
            ProductRanking::NewArrivals => ranked.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn list_related(&self, product: &Product, limit: i64) -> Result<Vec<Product>> {
        let store = self.0.lock().unwrap();
        let mut related: Vec<Product> = store
            .products
            .iter()
            .filter(|p| p.id != product.id && p.category_id == product.category_id)
            .filter(|p| p.is_on_shelf())
            .cloned()
            .collect();
        related.sort_by(|a, b| b.sales.cmp(&a.sales));
        related.truncate(limit as usize);
        Ok(related)
    }

    async fn sku_exists(&self, sku: &str, exclude_id: Option<i64>) -> Result<bool> {
        let store = self.0.lock().unwrap();
        Ok(store
            .products
            .iter()
            .any(|p| p.sku.as_deref() == Some(sku) && Some(p.id) != exclude_id))
    }

    async fn count_by_category(&self, category_id: i64) -> Result<i64> {
        let store = self.0.lock().unwrap();
        Ok(store
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .count() as i64)
    }

    async fn create(&self, draft: &ProductDraft, operator: &str) -> Result<Product> {
        let mut store = self.0.lock().unwrap();
        if let Some(sku) = &draft.sku {
            if store.products.iter().any(|p| p.sku.as_ref() == Some(sku)) {
                return Err(CatalogError::DuplicateSku(sku.clone()));
            }
        }
        let id = store.next_id();
        let product = product_from_draft(id, draft, operator);
        store.products.push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        draft: &ProductDraft,
        operator: &str,
    ) -> Result<Option<Product>> {
        let mut store = self.0.lock().unwrap();
        Ok(store.products.iter_mut().find(|p| p.id == id).map(|p| {
            let created_at = p.created_at;
            let created_by = p.created_by.clone();
            *p = product_from_draft(id, draft, operator);
            p.created_at = created_at;
            p.created_by = created_by;
            p.clone()
        }))
    }

    async fn update_status(&self, id: i64, status: ProductStatus) -> Result<Option<Product>> {
        let mut store = self.0.lock().unwrap();
        Ok(store.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.status = status;
            p.clone()
        }))
    }

    async fn update_stock(
        &self,
        id: i64,
        operation: StockOperation,
        quantity: i32,
    ) -> Result<Option<Product>> {
        let mut store = self.0.lock().unwrap();
        Ok(store.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.stock = operation.apply(p.stock, quantity);
            p.clone()
        }))
    }

    async fn update_recommend(&self, id: i64, patch: &RecommendPatch) -> Result<Option<Product>> {
        let mut store = self.0.lock().unwrap();
        Ok(store.products.iter_mut().find(|p| p.id == id).map(|p| {
            apply_patch(p, patch);
            p.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut store = self.0.lock().unwrap();
        let before = store.products.len();
        store.products.retain(|p| p.id != id);
        Ok(store.products.len() < before)
    }

    async fn batch_update_status(&self, ids: &[i64], status: ProductStatus) -> Result<u64> {
        let mut store = self.0.lock().unwrap();
        let mut modified = 0;
        for p in store.products.iter_mut().filter(|p| ids.contains(&p.id)) {
            p.status = status;
            modified += 1;
        }
        Ok(modified)
    }

    async fn batch_update_category(&self, ids: &[i64], category_id: i64) -> Result<u64> {
        let mut store = self.0.lock().unwrap();
        let mut modified = 0;
        for p in store.products.iter_mut().filter(|p| ids.contains(&p.id)) {
            p.category_id = category_id;
            modified += 1;
        }
        Ok(modified)
    }

    async fn batch_update_prices(&self, prices: &[(i64, i64)]) -> Result<u64> {
        let mut store = self.0.lock().unwrap();
        let mut modified = 0;
        for (id, price) in prices {
            if let Some(p) = store.products.iter_mut().find(|p| p.id == *id) {
                p.price = *price;
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn batch_update_recommend(&self, ids: &[i64], patch: &RecommendPatch) -> Result<u64> {
        let mut store = self.0.lock().unwrap();
        let mut modified = 0;
        for p in store.products.iter_mut().filter(|p| ids.contains(&p.id)) {
            apply_patch(p, patch);
            modified += 1;
        }
        Ok(modified)
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64> {
        let mut store = self.0.lock().unwrap();
        let before = store.products.len();
        store.products.retain(|p| !ids.contains(&p.id));
        Ok((before - store.products.len()) as u64)
    }
}
