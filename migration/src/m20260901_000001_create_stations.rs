use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Station::Table)
                    .if_not_exists()
                    .col(pk_auto(Station::Id))
                    .col(string_len(Station::Name, 100).not_null())
                    .col(string_len(Station::City, 100).not_null())
                    .col(string_len(Station::Code, 8).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // Seed stations
        let insert = Query::insert()
            .into_table(Station::Table)
            .columns([Station::Name, Station::City, Station::Code])
            .values_panic(["Amsterdam Centraal".into(), "Amsterdam".into(), "ASD".into()])
            .values_panic(["Rotterdam Centraal".into(), "Rotterdam".into(), "RTD".into()])
            .values_panic(["Den Haag Centraal".into(), "The Hague".into(), "GVC".into()])
            .values_panic(["Utrecht Centraal".into(), "Utrecht".into(), "UT".into()])
            .values_panic(["Eindhoven Centraal".into(), "Eindhoven".into(), "EHV".into()])
            .values_panic(["Groningen".into(), "Groningen".into(), "GN".into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Station::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Station {
    Table,
    Id,
    Name,
    City,
    Code,
}
