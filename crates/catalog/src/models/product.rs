//! 商品实体定义
//!
//! 金额字段统一以分为单位（i64），避免浮点误差。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;

use super::enums::ProductStatus;
use crate::pricing;

/// 商品尺寸（厘米）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// 推荐标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendFlags {
    pub is_recommended: bool,
    pub is_hot: bool,
    pub is_featured: bool,
    pub is_new: bool,
}

/// 推荐标记的部分更新，未提供的字段保持不变
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendPatch {
    pub is_recommended: Option<bool>,
    pub is_hot: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
}

impl RecommendPatch {
    pub fn is_empty(&self) -> bool {
        self.is_recommended.is_none()
            && self.is_hot.is_none()
            && self.is_featured.is_none()
            && self.is_new.is_none()
    }

    /// 应用到现有标记
    pub fn apply(&self, flags: RecommendFlags) -> RecommendFlags {
        RecommendFlags {
            is_recommended: self.is_recommended.unwrap_or(flags.is_recommended),
            is_hot: self.is_hot.unwrap_or(flags.is_hot),
            is_featured: self.is_featured.unwrap_or(flags.is_featured),
            is_new: self.is_new.unwrap_or(flags.is_new),
        }
    }

    /// 操作描述，用于批量操作结果展示
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        let pairs = [
            (self.is_recommended, "推荐", "取消推荐"),
            (self.is_hot, "热销", "取消热销"),
            (self.is_featured, "精选", "取消精选"),
            (self.is_new, "新品", "取消新品"),
        ];
        for (flag, on, off) in pairs {
            match flag {
                Some(true) => labels.push(on),
                Some(false) => labels.push(off),
                None => {}
            }
        }
        labels
    }
}

/// 商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    #[sqlx(default)]
    pub sku: Option<String>,
    /// 销售价（分）
    pub price: i64,
    /// 原价（分）
    #[sqlx(default)]
    pub original_price: Option<i64>,
    /// 成本价（分）
    #[sqlx(default)]
    pub cost: Option<i64>,
    pub stock: i32,
    pub sales: i32,
    #[sqlx(default)]
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub sort: i32,
    pub tags: Vec<String>,
    /// 规格参数，任意 JSON 对象
    pub specifications: Value,
    #[sqlx(default)]
    pub seo_title: Option<String>,
    #[sqlx(default)]
    pub seo_keywords: Option<String>,
    #[sqlx(default)]
    pub seo_description: Option<String>,
    /// 重量（克）
    #[sqlx(default)]
    pub weight: Option<i32>,
    #[sqlx(default)]
    pub dimensions: Option<Json<Dimensions>>,
    #[sqlx(default)]
    pub brand: Option<String>,
    #[sqlx(default)]
    pub model: Option<String>,
    pub is_recommended: bool,
    pub is_hot: bool,
    pub is_featured: bool,
    pub is_new: bool,
    #[sqlx(default)]
    pub created_by: Option<String>,
    #[sqlx(default)]
    pub updated_by: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updateTime")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn recommend_flags(&self) -> RecommendFlags {
        RecommendFlags {
            is_recommended: self.is_recommended,
            is_hot: self.is_hot,
            is_featured: self.is_featured,
            is_new: self.is_new,
        }
    }

    /// 利润率（百分比，保留两位小数）
    pub fn profit_margin(&self) -> Option<f64> {
        self.cost.and_then(|cost| pricing::profit_margin(self.price, cost))
    }

    /// 主图：第一张图片
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_on_shelf(&self) -> bool {
        self.status == ProductStatus::OnShelf
    }
}

/// 列表查询行：商品 + 分类名称
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    #[sqlx(flatten)]
    pub product: Product,
    #[sqlx(default)]
    pub category_name: Option<String>,
}

/// 商品展示视图，附带派生字段
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_path: Option<Vec<String>>,
    /// 利润率，缺少成本价时为 0
    pub profit_margin: f64,
    pub primary_image: Option<String>,
}

impl ProductView {
    pub fn new(product: Product, category_name: Option<String>) -> Self {
        let profit_margin = product.profit_margin().unwrap_or(0.0);
        let primary_image = product.primary_image().map(str::to_string);
        Self {
            product,
            category_name,
            category_path: None,
            profit_margin,
            primary_image,
        }
    }

    pub fn with_category_path(mut self, path: Vec<String>) -> Self {
        self.category_path = Some(path);
        self
    }
}

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        Self::new(row.product, row.category_name)
    }
}

/// 写入商品的数据（创建与全量更新共用）
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
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
    pub status: ProductStatus,
    pub sort: i32,
    pub tags: Vec<String>,
    pub specifications: Value,
    pub seo_title: Option<String>,
    pub seo_keywords: Option<String>,
    pub seo_description: Option<String>,
    pub weight: Option<i32>,
    pub dimensions: Option<Dimensions>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub flags: RecommendFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_patch_apply() {
        let flags = RecommendFlags {
            is_new: true,
            ..Default::default()
        };
        let patch = RecommendPatch {
            is_hot: Some(true),
            is_new: Some(false),
            ..Default::default()
        };
        let applied = patch.apply(flags);
        assert!(applied.is_hot);
        assert!(!applied.is_new);
        assert!(!applied.is_recommended);
    }

    #[test]
    fn test_recommend_patch_labels() {
        let patch = RecommendPatch {
            is_recommended: Some(true),
            is_featured: Some(false),
            ..Default::default()
        };
        assert_eq!(patch.labels(), vec!["推荐", "取消精选"]);
        assert!(RecommendPatch::default().is_empty());
        assert!(RecommendPatch::default().labels().is_empty());
    }
}
