//! 商品目录枚举类型定义
//!
//! 状态字段在数据库中存储为 SMALLINT，JSON 中序列化为 0/1 数字

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 分类状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum CategoryStatus {
    /// 禁用 - 不可挂载新商品
    Disabled = 0,
    /// 启用
    #[default]
    Enabled = 1,
}

impl CategoryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "禁用",
            Self::Enabled => "启用",
        }
    }
}

impl From<CategoryStatus> for i16 {
    fn from(status: CategoryStatus) -> Self {
        status as i16
    }
}

impl TryFrom<i16> for CategoryStatus {
    type Error = CatalogError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Enabled),
            other => Err(CatalogError::InvalidStatus(other)),
        }
    }
}

/// 商品状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum ProductStatus {
    /// 下架
    OffShelf = 0,
    /// 上架
    #[default]
    OnShelf = 1,
}

impl ProductStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OffShelf => "下架",
            Self::OnShelf => "上架",
        }
    }
}

impl From<ProductStatus> for i16 {
    fn from(status: ProductStatus) -> Self {
        status as i16
    }
}

impl TryFrom<i16> for ProductStatus {
    type Error = CatalogError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OffShelf),
            1 => Ok(Self::OnShelf),
            other => Err(CatalogError::InvalidStatus(other)),
        }
    }
}

/// 库存操作类型
/// 单个商品库存上限
pub const MAX_STOCK: i32 = 99_999_999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    /// 直接设置库存
    #[default]
    Set,
    /// 增加库存
    Add,
    /// 扣减库存，最低为 0
    Reduce,
}

impl StockOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Reduce => "reduce",
        }
    }

    /// 计算操作后的库存
    pub fn apply(&self, current: i32, quantity: i32) -> i32 {
        match self {
            Self::Set => quantity,
            Self::Add => current.saturating_add(quantity),
            Self::Reduce => (current - quantity).max(0),
        }
    }

    /// 计算操作后的库存，超出 `MAX_STOCK` 时返回 None
    pub fn checked_apply(&self, current: i32, quantity: i32) -> Option<i32> {
        let next = match self {
            Self::Set => i64::from(quantity),
            Self::Add => i64::from(current) + i64::from(quantity),
            Self::Reduce => (i64::from(current) - i64::from(quantity)).max(0),
        };
        (next <= i64::from(MAX_STOCK)).then_some(next as i32)
    }
}

/// 批量调价方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceAdjustType {
    /// 统一设置为固定价格（分）
    Fixed,
    /// 按百分比上调
    Percentage,
}

impl PriceAdjustType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percentage => "percentage",
        }
    }
}

/// 商品排行类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRanking {
    /// 热销：按销量倒序
    TopSelling,
    /// 新品：按创建时间倒序
    NewArrivals,
}

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
