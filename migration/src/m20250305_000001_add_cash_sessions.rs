use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

/// 收银抽屉会话（每个收银员同一时间只允许一个 open 会话，由服务层检查）
#[derive(DeriveIden)]
enum CashSessions {
    Table,
    Id,
    UserId,
    OpeningCash,
    OpenedAt,
    Status,
    ClosingCash,
    ClosedAt,
    ExpectedCash,
    TotalCashIn,
    TotalChange,
    Difference,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CashSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashSessions::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CashSessions::OpeningCash)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashSessions::OpenedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashSessions::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(CashSessions::ClosingCash).big_integer().null())
                    .col(
                        ColumnDef::new(CashSessions::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CashSessions::ExpectedCash)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashSessions::TotalCashIn)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashSessions::TotalChange)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CashSessions::Difference).big_integer().null())
                    .col(
                        ColumnDef::new(CashSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_sessions_user")
                            .from(CashSessions::Table, CashSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cash_sessions_user_status")
                    .table(CashSessions::Table)
                    .col(CashSessions::UserId)
                    .col(CashSessions::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(CashSessions::Table).to_owned())
            .await
    }
}
