//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: accounts resolved as identities
//! - `categories`, `payment_methods`, `places`, `cost_centers`: reference
//!   catalogs, one row per user-defined item
//! - `expenses`: dated amounts referencing one row of each catalog
//!
//! Nothing is ever deleted: rows carry an `active` flag that soft deletion
//! flips to false.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

const CATALOG_TABLES: [&str; 4] = ["categories", "payment_methods", "places", "cost_centers"];

#[derive(Iden)]
enum Users {
    Table,
    Username,
    PasswordHash,
}

/// Columns shared by every catalog table.
#[derive(Iden)]
enum Catalog {
    Id,
    UserId,
    Name,
    NameNorm,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    AmountMinor,
    Date,
    CategoryId,
    PaymentMethodId,
    PlaceId,
    CostCenterId,
    Active,
    CreatedAt,
}

fn catalog_table(table: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(table))
        .if_not_exists()
        .col(
            ColumnDef::new(Catalog::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Catalog::UserId).string().not_null())
        .col(ColumnDef::new(Catalog::Name).string().not_null())
        .col(ColumnDef::new(Catalog::NameNorm).string().not_null())
        .col(
            ColumnDef::new(Catalog::Active)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(
            ColumnDef::new(Catalog::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk-{table}-user_id"))
                .from(Alias::new(table), Catalog::UserId)
                .to(Users::Table, Users::Username)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn expense_reference(column: Expenses, table: &str) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(format!("fk-expenses-{}", column.to_string()))
        .from(Expenses::Table, column)
        .to(Alias::new(table), Catalog::Id)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        for table in CATALOG_TABLES {
            manager.create_table(catalog_table(table)).await?;
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx-{table}-user_id-active"))
                        .table(Alias::new(table))
                        .col(Catalog::UserId)
                        .col(Catalog::Active)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::PaymentMethodId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::PlaceId).integer().not_null())
                    .col(ColumnDef::new(Expenses::CostCenterId).integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut expense_reference(Expenses::CategoryId, "categories"))
                    .foreign_key(&mut expense_reference(
                        Expenses::PaymentMethodId,
                        "payment_methods",
                    ))
                    .foreign_key(&mut expense_reference(Expenses::PlaceId, "places"))
                    .foreign_key(&mut expense_reference(
                        Expenses::CostCenterId,
                        "cost_centers",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-date-active")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Date)
                    .col(Expenses::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).if_exists().to_owned())
            .await?;
        for table in CATALOG_TABLES.iter().rev() {
            manager
                .drop_table(Table::drop().table(Alias::new(*table)).if_exists().to_owned())
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
