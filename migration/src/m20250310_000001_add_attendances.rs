use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Attendances {
    Table,
    Id,
    UserId,
    Date,
    Status,
    Note,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attendances::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Attendances::Date).date().not_null())
                    // present / absent / off
                    .col(ColumnDef::new(Attendances::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Attendances::Note).text().null())
                    .col(
                        ColumnDef::new(Attendances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendances_user")
                            .from(Attendances::Table, Attendances::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每人每天一条
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendances_user_date_unique")
                    .table(Attendances::Table)
                    .col(Attendances::UserId)
                    .col(Attendances::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Attendances::Table).to_owned())
            .await
    }
}
