//! HTTP API
//!
//! - `POST /api/views`：记录一次浏览
//! - `GET|POST /api/cron/cleanup-views`：清理过期去重记录
//! - `GET /health`：健康检查

pub mod services;
pub mod session;

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use subtle::ConstantTimeEq;

use crate::utils::bearer_token;
use session::SessionVerifier;

/// 路由处理共享的设置（启动时从配置构建一次）
#[derive(Clone)]
pub struct ApiSettings {
    pub expire_hours: i64,
    pub session: Option<Arc<SessionVerifier>>,
    pub cron_secret: String,
}

impl ApiSettings {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self {
            expire_hours: config.views.expire_hours,
            session: SessionVerifier::from_config().map(Arc::new),
            cron_secret: config.auth.cron_secret.clone(),
        }
    }

    /// 请求中的登录用户 id
    pub fn user_id(&self, headers: &HeaderMap) -> Option<String> {
        self.session.as_ref().and_then(|s| s.user_id(headers))
    }

    /// cron 密钥校验；未配置密钥时放行
    pub fn cron_authorized(&self, headers: &HeaderMap) -> bool {
        if self.cron_secret.is_empty() {
            return true;
        }
        match bearer_token(headers) {
            Some(token) => token.as_bytes().ct_eq(self.cron_secret.as_bytes()).into(),
            None => false,
        }
    }
}
