//! 密码处理
//!
//! 使用 bcrypt 存储和校验管理员密码

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::AdminError;

/// 对密码进行哈希处理
pub fn hash_password(password: &str) -> Result<String, AdminError> {
    hash(password, DEFAULT_COST).map_err(|e| AdminError::Internal(format!("密码哈希失败: {}", e)))
}

/// 比较明文密码与存储的哈希值
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AdminError> {
    verify(password, hash).map_err(|e| AdminError::Internal(format!("密码验证失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("mall@2024").unwrap();

        assert_ne!(hashed, "mall@2024");
        assert!(verify_password("mall@2024", &hashed).unwrap());
        assert!(!verify_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_verify_against_malformed_hash() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
