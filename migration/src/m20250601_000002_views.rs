//! 浏览去重表迁移
//!
//! 创建 views 表，每条记录在 exp 之前阻止同一身份重复计数。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Views::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Views::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Views::Entity).string_len(255).not_null())
                    .col(ColumnDef::new(Views::UserId).string_len(255).null())
                    // IPv6 文本表示最长 45 字符
                    .col(ColumnDef::new(Views::UserIp).string_len(45).null())
                    .col(
                        ColumnDef::new(Views::Exp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 过期清理按 exp 扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_views_exp")
                    .table(Views::Table)
                    .col(Views::Exp)
                    .to_owned(),
            )
            .await?;

        // 去重查询：entity + exp > now
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_views_entity_exp")
                    .table(Views::Table)
                    .col(Views::Entity)
                    .col(Views::Exp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_views_entity_exp").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_views_exp").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Views::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Views {
    #[sea_orm(iden = "views")]
    Table,
    Id,
    Entity,
    UserId,
    UserIp,
    Exp,
}
