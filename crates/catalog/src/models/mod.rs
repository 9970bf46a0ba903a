//! 商品目录领域模型
//!
//! 包含分类与商品的核心实体定义

pub mod category;
pub mod enums;
pub mod product;

// 重新导出常用类型
pub use category::{
    Category, CategoryChanges, CategoryDetail, CategoryListItem, CategoryNode, CategoryOption,
    NewCategory, SubtreeMove,
};
pub use enums::{
    CategoryStatus, MAX_STOCK, PriceAdjustType, ProductRanking, ProductStatus, SortOrder,
    StockOperation,
};
pub use product::{
    Dimensions, Product, ProductDraft, ProductRow, ProductView, RecommendFlags, RecommendPatch,
};
