//! 浏览记录存储接口
//!
//! ViewManager 只通过这个 trait 访问存储，生产环境由 `SeaOrmStorage` 实现。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ViewTarget;
use crate::errors::Result;

/// 去重身份：登录用户优先，否则为客户端 IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    User(String),
    Ip(String),
}

/// 一条去重记录（对应 views 表）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    pub id: String,
    pub entity: String,
    pub user_id: Option<String>,
    pub user_ip: Option<String>,
    pub exp: DateTime<Utc>,
}

impl ViewRecord {
    pub fn new(entity: &str, viewer: &Viewer, exp: DateTime<Utc>) -> Self {
        let (user_id, user_ip) = match viewer {
            Viewer::User(id) => (Some(id.clone()), None),
            Viewer::Ip(ip) => (None, Some(ip.clone())),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entity: entity.to_string(),
            user_id,
            user_ip,
            exp,
        }
    }
}

/// 需要自增的计数器：目标表 + 行 id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRef<'a> {
    pub target: ViewTarget,
    pub id: &'a str,
}

#[async_trait]
pub trait ViewStore: Send + Sync {
    /// 查找 `exp > now` 且身份匹配的记录
    async fn find_active_view(
        &self,
        entity: &str,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Option<ViewRecord>>;

    async fn insert_view(&self, view: &ViewRecord) -> Result<()>;

    /// 原子自增 `view_count`，返回受影响行数
    async fn increment_view_count(&self, counter: CounterRef<'_>) -> Result<u64>;

    /// 删除 `exp <= now` 的记录，返回删除条数
    async fn delete_expired_views(&self, now: DateTime<Utc>) -> Result<u64>;

    /// 插入去重记录，然后自增计数器（两次独立写入）
    ///
    /// 实现可以覆盖为单事务版本。
    async fn create_view(&self, view: &ViewRecord, counter: Option<CounterRef<'_>>) -> Result<()> {
        self.insert_view(view).await?;
        if let Some(counter) = counter {
            self.increment_view_count(counter).await?;
        }
        Ok(())
    }
}
