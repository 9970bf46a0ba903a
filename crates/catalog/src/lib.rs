//! 商品目录领域
//!
//! 负责商品分类与商品的业务规则，供管理后台调用。
//!
//! ## 核心功能
//!
//! - **分类层级维护**：父子关系、level/path 计算、层级深度与环路校验、同级重名校验、删除保护
//! - **分类树重建**：单次遍历构建分类森林，深度优先展开为带缩进的下拉选项
//! - **商品规则**：价格/库存非负、原价不低于售价、SKU 唯一与自动生成
//! - **批量操作**：批量上下架、改分类、调价、推荐标记、删除
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `hierarchy`: 分类层级纯函数
//! - `sku`: SKU 编码生成
//! - `pricing`: 价格与库存规则
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层

pub mod error;
pub mod hierarchy;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod service;
pub mod sku;

pub use error::{CatalogError, Result};
pub use models::*;
pub use repository::{
    CategoryRepository, CategoryRepositoryTrait, ProductRepository, ProductRepositoryTrait,
};
pub use service::{CategoryService, ProductService, dto};
