//! 中间件模块
//!
//! 提供认证、权限检查和审计日志中间件

pub mod audit;
mod auth;
mod permission;

pub use audit::audit_middleware;
pub use auth::{auth_middleware, is_public};
pub use permission::require_permission;
