//! 商品目录错误类型
//!
//! 定义分类层级、商品规则相关的业务错误和系统错误

use thiserror::Error;

/// 商品目录错误类型
#[derive(Debug, Error)]
pub enum CatalogError {
    // === 分类相关错误 ===
    #[error("分类不存在: {0}")]
    CategoryNotFound(i64),

    #[error("父分类不存在")]
    ParentNotFound(i64),

    #[error("分类层级不能超过5级")]
    DepthExceeded,

    #[error("不能将分类设置为自己的父分类")]
    SelfParent,

    #[error("不能将分类设置为其子分类的父分类")]
    CycleDetected { id: i64, parent_id: i64 },

    #[error("同级分类名称不能重复")]
    DuplicateSiblingName(String),

    #[error("该分类下还有子分类，无法删除")]
    HasChildren(i64),

    #[error("该分类下还有商品，无法删除")]
    CategoryInUse { id: i64, products: i64 },

    #[error("商品分类不存在或已禁用")]
    CategoryUnavailable(i64),

    #[error("状态值无效")]
    InvalidStatus(i16),

    // === 商品相关错误 ===
    #[error("商品不存在: {0}")]
    ProductNotFound(i64),

    #[error("SKU编码已存在")]
    DuplicateSku(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error("{0}")]
    Validation(String),
}

/// 商品目录 Result 类型别名
pub type Result<T> = std::result::Result<T, CatalogError>;

/// PostgreSQL 唯一约束冲突错误码
const UNIQUE_VIOLATION: &str = "23505";

impl CatalogError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 是否为"资源不存在"类错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_) | Self::ProductNotFound(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DepthExceeded => "DEPTH_EXCEEDED",
            Self::SelfParent => "SELF_PARENT",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::DuplicateSiblingName(_) => "DUPLICATE_SIBLING_NAME",
            Self::HasChildren(_) => "CATEGORY_HAS_CHILDREN",
            Self::CategoryInUse { .. } => "CATEGORY_IN_USE",
            Self::CategoryUnavailable(_) => "CATEGORY_UNAVAILABLE",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// 将唯一约束冲突转换为对应的业务错误，其它数据库错误原样保留
    ///
    /// 先查后写的唯一性校验存在竞态，数据库唯一索引是最终裁决者。
    pub fn from_unique_violation(err: sqlx::Error, on_conflict: impl FnOnce() -> Self) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                on_conflict()
            }
            _ => Self::Database(err),
        }
    }
}
