//! View dedup record entity
//!
//! 每行代表一次被计数的浏览，在 `exp` 之前同一身份对同一实体的重复浏览不再计数。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "views")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// "{type}:{id}"
    pub entity: String,
    pub user_id: Option<String>,
    pub user_ip: Option<String>,
    pub exp: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
