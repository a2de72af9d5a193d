//! 浏览计数去重
//!
//! 同一身份（用户 id 或客户端 IP）在过期窗口内对同一实体只计一次浏览，
//! 新记录写入 views 表后对目标实体的 `view_count` 原子 +1。
//!
//! # 组成
//! - `entity`: `"type:id"` 解析与计数表分派
//! - `store`: 存储接口 `ViewStore`
//! - `memory`: 内存实现（仅单元测试）
//! - `cleanup`: 后台定期清理任务

pub mod cleanup;
pub mod entity;
#[cfg(test)]
pub mod memory;
pub mod store;

use std::fmt;
use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::errors::Result;

pub use cleanup::ViewCleanupTask;
pub use entity::{EntityRef, ViewTarget};
#[cfg(test)]
pub use memory::MemoryViewStore;
pub use store::{CounterRef, ViewRecord, ViewStore, Viewer};

/// 默认去重窗口（小时）
pub const DEFAULT_EXPIRE_HOURS: i64 = 24;
/// 去重窗口下限（小时）
pub const MIN_EXPIRE_HOURS: i64 = 1;

/// 构造参数
#[derive(Debug, Clone, Default)]
pub struct ViewManagerOptions {
    /// 去重窗口（小时），None 时为 24，小于 1 时按 1
    pub exp: Option<i64>,
    pub user_id: Option<String>,
    pub user_ip: Option<String>,
}

/// 输入被拒绝的原因（作为返回值，不是错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRejection {
    InvalidEntityFormat,
    MissingIdentity,
}

impl RecordRejection {
    pub fn message(&self) -> &'static str {
        match self {
            RecordRejection::InvalidEntityFormat => "Invalid entity format. Expected 'type:id'",
            RecordRejection::MissingIdentity => "No user ID or IP provided",
        }
    }
}

impl fmt::Display for RecordRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// `record_view_for_entity` 的结果
///
/// 序列化为 `{"created": bool}` 或 `{"created": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub created: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn created() -> Self {
        Self {
            created: true,
            error: None,
        }
    }

    /// 窗口内已记录过，不计数
    pub fn duplicate() -> Self {
        Self {
            created: false,
            error: None,
        }
    }

    pub fn rejected(reason: RecordRejection) -> Self {
        Self::failed(reason.message())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            created: false,
            error: Some(message.into()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }
}

pub struct ViewManager {
    store: Arc<dyn ViewStore>,
    expire_hours: i64,
    user_id: Option<String>,
    user_ip: Option<String>,
}

impl ViewManager {
    /// 构造不访问存储
    pub fn new(store: Arc<dyn ViewStore>, options: ViewManagerOptions) -> Self {
        let expire_hours = options
            .exp
            .unwrap_or(DEFAULT_EXPIRE_HOURS)
            .max(MIN_EXPIRE_HOURS);

        Self {
            store,
            expire_hours,
            user_id: options.user_id.filter(|s| !s.is_empty()),
            user_ip: options.user_ip.filter(|s| !s.is_empty()),
        }
    }

    pub fn expire_hours(&self) -> i64 {
        self.expire_hours
    }

    /// 去重身份：user_id 优先于 user_ip
    pub fn viewer(&self) -> Option<Viewer> {
        match (&self.user_id, &self.user_ip) {
            (Some(id), _) => Some(Viewer::User(id.clone())),
            (None, Some(ip)) => Some(Viewer::Ip(ip.clone())),
            (None, None) => None,
        }
    }

    /// 从代理请求头解析客户端 IP，失败时返回 None
    pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
        crate::utils::ip::extract_client_ip_from_headers(headers)
    }

    /// 删除所有已过期的去重记录，返回删除条数
    pub async fn cleanup_expired(store: &dyn ViewStore) -> Result<u64> {
        Self::cleanup_expired_at(store, Utc::now()).await
    }

    pub async fn cleanup_expired_at(store: &dyn ViewStore, now: DateTime<Utc>) -> Result<u64> {
        let deleted = store.delete_expired_views(now).await?;
        if deleted > 0 {
            info!("Expired view records cleaned up: {}", deleted);
        } else {
            debug!("No expired view records to clean up");
        }
        Ok(deleted)
    }

    pub async fn record_view_for_entity(&self, entity: &str) -> Result<RecordOutcome> {
        self.record_view_for_entity_at(entity, Utc::now()).await
    }

    /// 以给定时间记录一次浏览
    ///
    /// 校验顺序：先 entity 格式，再身份。两者都是返回值而非错误；
    /// 只有存储失败才返回 Err。
    pub async fn record_view_for_entity_at(
        &self,
        entity: &str,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        let Some(entity_ref) = EntityRef::parse(entity) else {
            trace!("Rejected malformed entity: {}", entity);
            return Ok(RecordOutcome::rejected(
                RecordRejection::InvalidEntityFormat,
            ));
        };

        let Some(viewer) = self.viewer() else {
            return Ok(RecordOutcome::rejected(RecordRejection::MissingIdentity));
        };

        let exp = now + Duration::hours(self.expire_hours);

        if self
            .store
            .find_active_view(entity, &viewer, now)
            .await?
            .is_some()
        {
            trace!("View already recorded within window: {}", entity);
            return Ok(RecordOutcome::duplicate());
        }

        // 未知类型仍然写入去重记录，只是没有计数器可加
        let counter = entity_ref.target().map(|target| CounterRef {
            target,
            id: entity_ref.id,
        });
        if counter.is_none() {
            debug!(
                "Unknown entity type '{}', recording view without counter",
                entity_ref.kind
            );
        }

        let record = ViewRecord::new(entity, &viewer, exp);
        self.store.create_view(&record, counter).await?;

        debug!("View recorded: {}", entity);
        Ok(RecordOutcome::created())
    }
}
