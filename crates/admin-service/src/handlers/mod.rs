//! HTTP 请求处理器模块

pub mod auth;
pub mod category;
pub mod operation_log;
pub mod product;
pub mod system_permission;
pub mod system_resource;
pub mod system_role;
pub mod system_user;
