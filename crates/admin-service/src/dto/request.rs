//! 请求 DTO 定义
//!
//! 商品目录相关的请求参数与请求体，负责字段级校验并转换为领域层输入。
//! 系统管理类请求体定义在各自的 handler 中。

use mall_catalog::dto::{
    CategoryInput, CategoryOrderBy, CategoryQuery, ParentFilter, ProductInput, ProductOrderBy,
    ProductQuery, normalize_page,
};
use mall_catalog::{
    CategoryStatus, Dimensions, PriceAdjustType, ProductStatus, RecommendPatch, SortOrder,
    StockOperation,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::{AdminError, Result};

// ==================== 通用 ====================

/// 反序列化时去除首尾空白，纯空白输入随后由 `length(min = 1)` 拒绝
pub fn trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// 可选字段版本的 [`trimmed`]
pub fn trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|v| v.map(|s| s.trim().to_string()))
}

/// 分页参数
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size", alias = "pageSize")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PaginationParams {
    /// 规范化后的 (page, size)，size 限制在 1-100
    pub fn normalized(&self) -> (i64, i64) {
        let (page, size, _) = normalize_page(self.page, self.size);
        (page, size)
    }

    pub fn offset(&self) -> i64 {
        normalize_page(self.page, self.size).2
    }
}

/// 状态更新请求
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: i16,
}

fn parse_order(raw: Option<&str>, default: SortOrder) -> SortOrder {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        _ => default,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ==================== 分类 ====================

/// 创建或更新分类请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 50, message = "分类名称长度必须在1-50个字符之间"))]
    pub name: String,
    pub parent_id: Option<i64>,
    #[validate(range(min = 0, message = "排序值不能为负数"))]
    pub sort: Option<i32>,
    pub status: Option<i16>,
    #[validate(length(max = 200, message = "分类描述不能超过200个字符"))]
    pub description: Option<String>,
    #[validate(length(max = 100, message = "分类图标不能超过100个字符"))]
    pub icon: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
            sort: req.sort.unwrap_or(0),
            status: req.status,
            description: req.description,
            icon: req.icon,
        }
    }
}

/// 分类列表过滤条件
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
    pub keyword: Option<String>,
    pub status: Option<i16>,
    /// `null` 或空串表示只查根分类
    pub parent_id: Option<String>,
    pub level: Option<i32>,
    pub order_by: Option<String>,
    pub order: Option<String>,
}

impl CategoryFilter {
    pub fn into_query(self, pagination: &PaginationParams) -> Result<CategoryQuery> {
        let (page, size) = pagination.normalized();
        let parent = ParentFilter::parse(self.parent_id.as_deref())
            .ok_or_else(|| AdminError::Validation("父分类ID格式不正确".to_string()))?;
        let status = self.status.map(CategoryStatus::try_from).transpose()?;

        Ok(CategoryQuery {
            keyword: non_blank(self.keyword),
            status,
            parent,
            level: self.level,
            order_by: CategoryOrderBy::parse(self.order_by.as_deref()),
            order: parse_order(self.order.as_deref(), SortOrder::Asc),
            page,
            size,
        })
    }
}

/// 分类树查询参数
#[derive(Debug, Default, Deserialize)]
pub struct CategoryTreeParams {
    pub status: Option<i16>,
}

/// 分类下拉选项查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOptionsParams {
    #[serde(default = "default_enabled")]
    pub status: i16,
    /// 只展开到该层级（含）
    #[serde(alias = "level")]
    pub max_level: Option<i32>,
}

fn default_enabled() -> i16 {
    CategoryStatus::Enabled.into()
}

// ==================== 商品 ====================

/// 创建或更新商品请求
///
/// 金额单位为分
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 100, message = "商品名称长度必须在1-100个字符之间"))]
    pub name: String,
    pub category_id: i64,
    #[validate(length(max = 50, message = "SKU不能超过50个字符"))]
    pub sku: Option<String>,
    #[validate(range(min = 0, message = "销售价格不能为负数"))]
    pub price: i64,
    #[validate(range(min = 0, message = "原价不能为负数"))]
    pub original_price: Option<i64>,
    #[validate(range(min = 0, message = "成本价不能为负数"))]
    pub cost: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, message = "库存不能为负数"))]
    pub stock: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "销量不能为负数"))]
    pub sales: i32,
    #[validate(length(max = 2000, message = "商品描述不能超过2000个字符"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_images"))]
    pub images: Vec<String>,
    pub status: Option<i16>,
    #[validate(range(min = 0, message = "排序值不能为负数"))]
    pub sort: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    pub specifications: Option<Value>,
    #[validate(length(max = 100, message = "SEO标题不能超过100个字符"))]
    pub seo_title: Option<String>,
    #[validate(length(max = 200, message = "SEO关键词不能超过200个字符"))]
    pub seo_keywords: Option<String>,
    #[validate(length(max = 300, message = "SEO描述不能超过300个字符"))]
    pub seo_description: Option<String>,
    #[validate(range(min = 0, message = "重量不能为负数"))]
    pub weight: Option<i32>,
    #[validate(custom(function = "validate_dimensions"))]
    pub dimensions: Option<Dimensions>,
    #[validate(length(max = 50, message = "品牌不能超过50个字符"))]
    pub brand: Option<String>,
    #[validate(length(max = 50, message = "型号不能超过50个字符"))]
    pub model: Option<String>,
    pub is_recommended: Option<bool>,
    pub is_hot: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
}

fn validate_images(images: &Vec<String>) -> std::result::Result<(), ValidationError> {
    if images.iter().any(|url| url.chars().count() > 200) {
        return Err(ValidationError::new("image_too_long")
            .with_message("图片地址不能超过200个字符".into()));
    }
    Ok(())
}

fn validate_tags(tags: &Vec<String>) -> std::result::Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.chars().count() > 20) {
        return Err(ValidationError::new("tag_too_long").with_message("标签不能超过20个字符".into()));
    }
    Ok(())
}

fn validate_dimensions(dimensions: &Dimensions) -> std::result::Result<(), ValidationError> {
    if dimensions.length < 0.0 || dimensions.width < 0.0 || dimensions.height < 0.0 {
        return Err(ValidationError::new("negative_dimension")
            .with_message("尺寸不能为负数".into()));
    }
    Ok(())
}

impl From<ProductRequest> for ProductInput {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            category_id: req.category_id,
            sku: req.sku,
            price: req.price,
            original_price: req.original_price,
            cost: req.cost,
            stock: req.stock,
            sales: req.sales,
            description: req.description,
            images: req.images,
            status: req.status,
            sort: req.sort.unwrap_or(0),
            tags: req.tags,
            specifications: req.specifications,
            seo_title: req.seo_title,
            seo_keywords: req.seo_keywords,
            seo_description: req.seo_description,
            weight: req.weight,
            dimensions: req.dimensions,
            brand: req.brand,
            model: req.model,
            is_recommended: req.is_recommended,
            is_hot: req.is_hot,
            is_featured: req.is_featured,
            is_new: req.is_new,
        }
    }
}

/// 商品列表过滤条件
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub keyword: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<i16>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub brand: Option<String>,
    /// 1：有库存；0：无库存
    pub in_stock: Option<i16>,
    pub order_by: Option<String>,
    pub order: Option<String>,
}

impl ProductFilter {
    pub fn into_query(self, pagination: &PaginationParams) -> Result<ProductQuery> {
        let (page, size) = pagination.normalized();
        let status = self.status.map(ProductStatus::try_from).transpose()?;

        Ok(ProductQuery {
            keyword: non_blank(self.keyword),
            category_id: self.category_id,
            status,
            min_price: self.min_price,
            max_price: self.max_price,
            brand: non_blank(self.brand),
            in_stock: self.in_stock.map(|flag| flag == 1),
            order_by: ProductOrderBy::parse(self.order_by.as_deref()),
            order: parse_order(self.order.as_deref(), SortOrder::Desc),
            page,
            size,
        })
    }
}

/// 排行类查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub category_id: Option<i64>,
}

fn default_limit() -> i64 {
    10
}

/// 库存更新请求
#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub quantity: i32,
    #[serde(default)]
    pub operation: StockOperation,
}

// ==================== 批量操作 ====================

#[derive(Debug, Deserialize)]
pub struct BatchIdsRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub status: i16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCategoryRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPriceRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub adjust_type: PriceAdjustType,
    pub adjust_value: f64,
}

#[derive(Debug, Deserialize)]
pub struct BatchRecommendRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    #[serde(flatten)]
    pub flags: RecommendPatch,
}
