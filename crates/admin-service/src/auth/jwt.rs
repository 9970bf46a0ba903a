//! JWT Token 处理
//!
//! 密钥、有效期和签发者均来自 `auth.jwt` 配置。

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mall_shared::config::JwtSettings;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AdminError;

/// 未配置密钥时临时生成的密钥长度
const EPHEMERAL_SECRET_LEN: usize = 48;

/// JWT Claims（Token 载荷）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    pub username: String,
    pub nickname: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    issuer: String,
    expires_in_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// 使用指定密钥创建
    pub fn new(secret: &str, expires_in_secs: i64, issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            expires_in_secs,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// 从配置创建
    ///
    /// 生产环境必须配置密钥；其它环境缺省时生成进程级随机密钥，重启后旧 Token 失效。
    pub fn from_settings(settings: &JwtSettings, production: bool) -> Result<Self, AdminError> {
        let expires_in_secs = i64::try_from(settings.expires_in_secs)
            .map_err(|_| AdminError::Internal("JWT 有效期配置过大".to_string()))?;

        let secret = match settings.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ if production => {
                return Err(AdminError::Internal(
                    "生产环境必须配置 auth.jwt.secret".to_string(),
                ));
            }
            _ => {
                warn!("auth.jwt.secret 未配置，使用临时随机密钥");
                rand::rng()
                    .sample_iter(&Alphanumeric)
                    .take(EPHEMERAL_SECRET_LEN)
                    .map(char::from)
                    .collect()
            }
        };

        Ok(Self::new(&secret, expires_in_secs, settings.issuer.clone()))
    }

    /// 生成 JWT Token，返回 (token, 过期时间戳)
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        nickname: Option<&str>,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<(String, i64), AdminError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            nickname: nickname.map(str::to_string),
            roles,
            permissions,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AdminError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 验证并解析 JWT Token，无效或过期返回 `InvalidToken`
    pub fn verify_token(&self, token: &str) -> Result<Claims, AdminError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AdminError::InvalidToken("token已过期".to_string())
                }
                _ => AdminError::InvalidToken("token无效或已过期".to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in_secs
    }
}
