//! 会话令牌校验
//!
//! 登录由外部认证服务负责，这里只校验其签发的 HS256 JWT，
//! 取 `sub` 作为浏览去重用的用户 id。

use actix_web::http::header::HeaderMap;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::utils::bearer_token;

/// Session Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// 未配置密钥时返回 None，此时所有请求按匿名处理
    pub fn from_config() -> Option<Self> {
        let config = crate::config::get_config();
        let secret = config.auth.jwt_secret.trim();
        if secret.is_empty() {
            None
        } else {
            Some(Self::new(secret))
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// 从 `Authorization: Bearer` 解析用户 id，无效令牌视为匿名
    pub fn user_id(&self, headers: &HeaderMap) -> Option<String> {
        let token = bearer_token(headers)?;
        match self.verify(token) {
            Ok(claims) if !claims.sub.is_empty() => Some(claims.sub),
            Ok(_) => None,
            Err(e) => {
                trace!("Session token rejected: {}", e);
                None
            }
        }
    }
}
