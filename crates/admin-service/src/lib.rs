//! 商城管理后台服务
//!
//! 提供商品分类、商品、系统管理（用户、角色、权限点、资源）和操作日志的 REST API。
//!
//! ## 模块结构
//!
//! - `auth`: JWT 签发校验、密码哈希、权限判定
//! - `dto`: 请求与响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证、权限、审计中间件
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `bootstrap`: 启动时初始化管理员账号

pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, PageResponse, PaginationParams};
pub use error::{AdminError, Result};
