//! Migration: customer records with soft delete flag.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::Title).string_len(5).not_null())
                    .col(ColumnDef::new(Customers::CustomerCategory).string_len(20).not_null())
                    .col(ColumnDef::new(Customers::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Customers::LastName).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Customers::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::Address1).string_len(255).not_null())
                    .col(ColumnDef::new(Customers::Address2).string_len(255).null())
                    .col(ColumnDef::new(Customers::City).string_len(100).not_null())
                    .col(ColumnDef::new(Customers::Mobile).string_len(20).not_null())
                    .col(ColumnDef::new(Customers::Phone).string_len(20).null())
                    .col(ColumnDef::new(Customers::CompanyName).string_len(100).null())
                    .col(ColumnDef::new(Customers::Photo).string_len(255).null())
                    .col(
                        ColumnDef::new(Customers::CreditLimit)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Customers::CreditPeriod).integer().not_null())
                    .col(
                        ColumnDef::new(Customers::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // Every read filters on the flag and most on city as well
        manager
            .create_index(
                Index::create()
                    .name("idx_customers_is_deleted_city")
                    .table(Customers::Table)
                    .col(Customers::IsDeleted)
                    .col(Customers::City)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    Title,
    CustomerCategory,
    FirstName,
    LastName,
    Email,
    #[iden = "address_1"]
    Address1,
    #[iden = "address_2"]
    Address2,
    City,
    Mobile,
    Phone,
    CompanyName,
    Photo,
    CreditLimit,
    CreditPeriod,
    IsDeleted,
}
