//! 业务服务层
//!
//! 组合仓储完成分类与商品的业务校验和写入

mod category_service;
pub mod dto;
mod product_service;

pub use category_service::CategoryService;
pub use product_service::ProductService;
