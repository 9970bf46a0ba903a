//! 启动初始化
//!
//! 管理员表为空时按配置创建初始账号，避免全新部署后无人可登录。

use mall_shared::config::AuthConfig;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::error::Result;

const FALLBACK_ROLE: &str = "admin";

/// 初始账号使用的角色：取第一个管理员角色
pub fn bootstrap_role(auth: &AuthConfig) -> &str {
    auth.admin_roles
        .first()
        .map(String::as_str)
        .unwrap_or(FALLBACK_ROLE)
}

/// 确保至少存在一个管理员账号
///
/// 返回是否创建了新账号。未配置初始密码时只输出警告。
pub async fn ensure_admin_user(pool: &PgPool, auth: &AuthConfig) -> Result<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    let settings = &auth.bootstrap;
    let password = match settings.password.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => {
            warn!("admin_users 为空且未配置 auth.bootstrap.password，后台将无法登录");
            return Ok(false);
        }
    };

    let password_hash = hash_password(password)?;
    let role = bootstrap_role(auth);

    let result = sqlx::query(
        r#"
        INSERT INTO admin_users (username, password_hash, nickname, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(&settings.username)
    .bind(&password_hash)
    .bind("超级管理员")
    .bind(role)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        info!(username = %settings.username, role = %role, "Bootstrap admin user created");
    }
    Ok(created)
}
