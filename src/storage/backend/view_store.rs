//! ViewStore implementation for SeaOrmStorage
//!
//! 计数器自增使用 `view_count = view_count + 1`，不在应用内读改写。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait,
    QueryFilter, TransactionTrait,
};
use tracing::{trace, warn};

use super::SeaOrmStorage;
use crate::errors::Result;
use crate::views::{CounterRef, ViewRecord, ViewStore, ViewTarget, Viewer};

use migration::entities::{bounty, grant, grant_application, rfp, submission, view};

macro_rules! increment_counter {
    ($entity:ident, $db:expr, $id:expr) => {
        $entity::Entity::update_many()
            .col_expr(
                $entity::Column::ViewCount,
                Expr::col($entity::Column::ViewCount).add(1i64),
            )
            .filter($entity::Column::Id.eq($id))
            .exec($db)
            .await?
            .rows_affected
    };
}

macro_rules! read_counter {
    ($entity:ident, $db:expr, $id:expr) => {
        $entity::Entity::find_by_id($id.to_string())
            .one($db)
            .await?
            .map(|m| m.view_count)
    };
}

fn model_to_record(model: view::Model) -> ViewRecord {
    ViewRecord {
        id: model.id,
        entity: model.entity,
        user_id: model.user_id,
        user_ip: model.user_ip,
        exp: model.exp,
    }
}

async fn insert_with<C: ConnectionTrait>(db: &C, record: &ViewRecord) -> Result<()> {
    view::ActiveModel {
        id: Set(record.id.clone()),
        entity: Set(record.entity.clone()),
        user_id: Set(record.user_id.clone()),
        user_ip: Set(record.user_ip.clone()),
        exp: Set(record.exp),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn increment_with<C: ConnectionTrait>(db: &C, counter: CounterRef<'_>) -> Result<u64> {
    let id = counter.id;
    let rows = match counter.target {
        ViewTarget::Grant => increment_counter!(grant, db, id),
        ViewTarget::Bounty => increment_counter!(bounty, db, id),
        ViewTarget::Rfp => increment_counter!(rfp, db, id),
        ViewTarget::Submission => increment_counter!(submission, db, id),
        ViewTarget::GrantApplication => increment_counter!(grant_application, db, id),
    };

    if rows == 0 {
        warn!(
            "view_count not incremented: no row '{}' in {}",
            id, counter.target
        );
    } else {
        trace!("view_count incremented: {}:{}", counter.target, id);
    }
    Ok(rows)
}

impl SeaOrmStorage {
    /// 读取实体当前的 view_count，行不存在时返回 None
    pub async fn view_count(&self, target: ViewTarget, id: &str) -> Result<Option<i64>> {
        let db = self.get_db();
        let count = match target {
            ViewTarget::Grant => read_counter!(grant, db, id),
            ViewTarget::Bounty => read_counter!(bounty, db, id),
            ViewTarget::Rfp => read_counter!(rfp, db, id),
            ViewTarget::Submission => read_counter!(submission, db, id),
            ViewTarget::GrantApplication => read_counter!(grant_application, db, id),
        };
        Ok(count)
    }
}

#[async_trait]
impl ViewStore for SeaOrmStorage {
    async fn find_active_view(
        &self,
        entity: &str,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<Option<ViewRecord>> {
        let query = view::Entity::find()
            .filter(view::Column::Entity.eq(entity))
            .filter(view::Column::Exp.gt(now));

        let query = match viewer {
            Viewer::User(id) => query.filter(view::Column::UserId.eq(id.as_str())),
            Viewer::Ip(ip) => query.filter(view::Column::UserIp.eq(ip.as_str())),
        };

        Ok(query.one(self.get_db()).await?.map(model_to_record))
    }

    async fn insert_view(&self, record: &ViewRecord) -> Result<()> {
        insert_with(self.get_db(), record).await
    }

    async fn increment_view_count(&self, counter: CounterRef<'_>) -> Result<u64> {
        increment_with(self.get_db(), counter).await
    }

    async fn delete_expired_views(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = view::Entity::delete_many()
            .filter(view::Column::Exp.lte(now))
            .exec(self.get_db())
            .await?;
        Ok(result.rows_affected)
    }

    async fn create_view(&self, record: &ViewRecord, counter: Option<CounterRef<'_>>) -> Result<()> {
        if !self.is_transactional() {
            insert_with(self.get_db(), record).await?;
            if let Some(counter) = counter {
                increment_with(self.get_db(), counter).await?;
            }
            return Ok(());
        }

        // 事务模式：任一步失败整体回滚
        let txn = self.get_db().begin().await?;
        let result = async {
            insert_with(&txn, record).await?;
            if let Some(counter) = counter {
                increment_with(&txn, counter).await?;
            }
            Ok::<_, crate::errors::OpentribeError>(())
        }
        .await;

        match result {
            Ok(()) => {
                txn.commit().await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Failed to roll back view transaction: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
