//! 可浏览实体表迁移
//!
//! grants / bounties / rfps / submissions / grant_applications
//! 这里只建 view 计数相关的列，其余业务字段由主站 schema 管理。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in counter_tables() {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Counter::Id)
                                .string_len(64)
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Counter::ViewCount)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Counter::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in counter_tables() {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn counter_tables() -> [CounterTable; 5] {
    [
        CounterTable::Grants,
        CounterTable::Bounties,
        CounterTable::Rfps,
        CounterTable::Submissions,
        CounterTable::GrantApplications,
    ]
}

#[derive(DeriveIden, Clone, Copy)]
enum CounterTable {
    Grants,
    Bounties,
    Rfps,
    Submissions,
    GrantApplications,
}

#[derive(DeriveIden)]
enum Counter {
    Id,
    ViewCount,
    CreatedAt,
}
