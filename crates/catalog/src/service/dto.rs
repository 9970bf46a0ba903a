//! 服务层数据传输对象
//!
//! 定义服务层的输入、查询条件和批量操作结果

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    CategoryStatus, Dimensions, PriceAdjustType, ProductStatus, RecommendFlags, SortOrder,
};

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 100;

/// 页码上限，超出时按最后允许的页码查询
pub const MAX_PAGE: i64 = 1_000_000;

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// 规范化页码与每页条数，返回 (page, size, offset)
pub fn normalize_page(page: i64, size: i64) -> (i64, i64, i64) {
    let page = page.clamp(1, MAX_PAGE);
    let size = size.clamp(1, MAX_PAGE_SIZE);
    (page, size, (page - 1).saturating_mul(size))
}

// ==================== 分类 ====================

/// 按父分类过滤
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentFilter {
    /// 不过滤
    #[default]
    Any,
    /// 仅根分类
    Root,
    /// 指定父分类的直接子分类
    Parent(i64),
}

impl ParentFilter {
    /// 解析查询参数：`null` 或空串表示根分类
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            None => Some(Self::Any),
            Some("") | Some("null") => Some(Self::Root),
            Some(s) => s.parse().ok().map(Self::Parent),
        }
    }
}

/// 分类列表排序字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrderBy {
    #[default]
    Sort,
    CreateTime,
    UpdateTime,
    Name,
    Level,
}

impl CategoryOrderBy {
    /// 未知字段回退到默认排序
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("createTime") => Self::CreateTime,
            Some("updateTime") => Self::UpdateTime,
            Some("name") => Self::Name,
            Some("level") => Self::Level,
            _ => Self::Sort,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Sort => "c.sort",
            Self::CreateTime => "c.created_at",
            Self::UpdateTime => "c.updated_at",
            Self::Name => "c.name",
            Self::Level => "c.level",
        }
    }
}

/// 分类列表查询条件
#[derive(Debug, Clone)]
pub struct CategoryQuery {
    /// 名称或描述模糊匹配
    pub keyword: Option<String>,
    pub status: Option<CategoryStatus>,
    pub parent: ParentFilter,
    pub level: Option<i32>,
    pub order_by: CategoryOrderBy,
    pub order: SortOrder,
    pub page: i64,
    pub size: i64,
}

impl Default for CategoryQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            status: None,
            parent: ParentFilter::Any,
            level: None,
            order_by: CategoryOrderBy::Sort,
            order: SortOrder::Asc,
            page: 1,
            size: 20,
        }
    }
}

/// 创建或更新分类的输入
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort: i32,
    /// 0/1，为空时创建默认启用、更新保持原值
    pub status: Option<i16>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

// ==================== 商品 ====================

/// 商品列表排序字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrderBy {
    #[default]
    CreateTime,
    UpdateTime,
    Name,
    Price,
    Sales,
    Stock,
    Sort,
}

impl ProductOrderBy {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("updateTime") => Self::UpdateTime,
            Some("name") => Self::Name,
            Some("price") => Self::Price,
            Some("sales") => Self::Sales,
            Some("stock") => Self::Stock,
            Some("sort") => Self::Sort,
            _ => Self::CreateTime,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreateTime => "p.created_at",
            Self::UpdateTime => "p.updated_at",
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::Sales => "p.sales",
            Self::Stock => "p.stock",
            Self::Sort => "p.sort",
        }
    }
}

/// 商品列表查询条件
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// 名称、SKU、描述、品牌、型号、标签模糊匹配
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub brand: Option<String>,
    /// true：有库存；false：无库存
    pub in_stock: Option<bool>,
    pub order_by: ProductOrderBy,
    pub order: SortOrder,
    pub page: i64,
    pub size: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            category_id: None,
            status: None,
            min_price: None,
            max_price: None,
            brand: None,
            in_stock: None,
            order_by: ProductOrderBy::CreateTime,
            order: SortOrder::Desc,
            page: 1,
            size: 20,
        }
    }
}

/// 创建或更新商品的输入
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub category_id: i64,
    pub sku: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub cost: Option<i64>,
    pub stock: i32,
    pub sales: i32,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: Option<i16>,
    pub sort: i32,
    pub tags: Vec<String>,
    pub specifications: Option<Value>,
    pub seo_title: Option<String>,
    pub seo_keywords: Option<String>,
    pub seo_description: Option<String>,
    pub weight: Option<i32>,
    pub dimensions: Option<Dimensions>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub is_recommended: Option<bool>,
    pub is_hot: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
}

impl ProductInput {
    /// 推荐标记：未提供的取新品默认值
    pub fn flags_or(&self, base: RecommendFlags) -> RecommendFlags {
        RecommendFlags {
            is_recommended: self.is_recommended.unwrap_or(base.is_recommended),
            is_hot: self.is_hot.unwrap_or(base.is_hot),
            is_featured: self.is_featured.unwrap_or(base.is_featured),
            is_new: self.is_new.unwrap_or(base.is_new),
        }
    }
}

/// 新建商品的默认推荐标记
pub fn default_flags() -> RecommendFlags {
    RecommendFlags {
        is_new: true,
        ..Default::default()
    }
}

// ==================== 批量操作结果 ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResult {
    pub modified_count: u64,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCategoryResult {
    pub modified_count: u64,
    pub total_count: usize,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPriceResult {
    pub modified_count: u64,
    pub total_count: usize,
    pub adjust_type: PriceAdjustType,
    pub adjust_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecommendResult {
    pub modified_count: u64,
    pub total_count: usize,
    pub operations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    pub deleted_count: u64,
    pub total_count: usize,
}
