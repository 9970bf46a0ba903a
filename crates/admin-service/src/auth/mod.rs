//! 认证模块
//!
//! 提供 JWT Token 签发与校验、密码哈希以及基于配置的权限判定

mod jwt;
mod password;
mod policy;

pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};
pub use policy::AccessPolicy;
