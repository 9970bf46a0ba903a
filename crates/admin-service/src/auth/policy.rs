//! 权限判定
//!
//! 管理员角色、管理员权限和默认权限都来自 `auth` 配置。

use mall_shared::config::AuthConfig;

use super::Claims;

/// 拥有全部权限的通配符
pub const WILDCARD: &str = "*";

/// 访问策略
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_roles: Vec<String>,
    admin_permissions: Vec<String>,
    default_permissions: Vec<String>,
}

impl AccessPolicy {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            admin_roles: config.admin_roles.clone(),
            admin_permissions: config.admin_permissions.clone(),
            default_permissions: config.default_permissions.clone(),
        }
    }

    pub fn is_admin_role(&self, role: &str) -> bool {
        self.admin_roles.iter().any(|r| r == role)
    }

    /// 登录时签发的权限列表
    ///
    /// 管理员角色取配置的管理员权限；其它角色取角色表中的权限，为空时取默认权限。
    pub fn permissions_for(&self, role: &str, role_permissions: Vec<String>) -> Vec<String> {
        if self.is_admin_role(role) {
            self.admin_permissions.clone()
        } else if role_permissions.is_empty() {
            self.default_permissions.clone()
        } else {
            role_permissions
        }
    }

    /// 判断 Token 是否满足所需权限
    pub fn allows(&self, claims: &Claims, required: &str) -> bool {
        if claims.roles.iter().any(|r| self.is_admin_role(r)) {
            return true;
        }
        claims
            .permissions
            .iter()
            .any(|granted| permission_matches(granted, required))
    }
}

/// 单条权限匹配：`*` 匹配全部，`a:b:*` 匹配 `a:b:<action>`
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == WILDCARD || granted == required {
        return true;
    }
    match granted.strip_suffix(":*") {
        Some(prefix) => required
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(':')),
        None => false,
    }
}
