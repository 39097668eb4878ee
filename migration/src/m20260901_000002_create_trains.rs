use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Train::Table)
                    .if_not_exists()
                    .col(pk_auto(Train::Id))
                    .col(string_len(Train::Number, 16).not_null().unique_key())
                    // express | intercity | regional
                    .col(string_len(Train::Category, 16).not_null())
                    .col(boolean(Train::HasWifi).not_null().default(false))
                    .col(boolean(Train::HasCatering).not_null().default(false))
                    .col(integer(Train::TotalSeats).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Train::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Train {
    Table,
    Id,
    Number,
    Category,
    HasWifi,
    HasCatering,
    TotalSeats,
}
