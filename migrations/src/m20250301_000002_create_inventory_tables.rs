use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Items::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Items::Sku).string().not_null().unique_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(
                        ColumnDef::new(Items::Price)
                            .decimal_len(16, 4)
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Items::Barcode).string().null())
                    // Aggregate totals are nullable: rows imported from the
                    // legacy schema may carry only the legacy_* fields until
                    // the legacy migration has backfilled them.
                    .col(ColumnDef::new(Items::TotalOnHand).integer().null())
                    .col(ColumnDef::new(Items::TotalCommitted).integer().null())
                    .col(ColumnDef::new(Items::TotalUnavailable).integer().null())
                    .col(ColumnDef::new(Items::TotalAvailable).integer().null())
                    // Deprecated flat stock fields kept nullable until the
                    // legacy migration pass has nulled them everywhere.
                    .col(ColumnDef::new(Items::LegacyOnhand).integer().null())
                    .col(ColumnDef::new(Items::LegacyCommitted).integer().null())
                    .col(ColumnDef::new(Items::LegacyAvailable).integer().null())
                    .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Items::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Items::Table, Items::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Locations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Locations::Kind)
                            .string()
                            .not_null()
                            .default("warehouse"),
                    )
                    .col(
                        ColumnDef::new(Locations::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Locations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Locations::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Locations::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ItemLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemLocations::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemLocations::ItemId).uuid().not_null())
                    .col(ColumnDef::new(ItemLocations::LocationId).uuid().not_null())
                    .col(
                        ColumnDef::new(ItemLocations::OnHand)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemLocations::Committed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemLocations::Unavailable)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ItemLocations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemLocations::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemLocations::Table, ItemLocations::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemLocations::Table, ItemLocations::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_locations_item_location")
                    .table(ItemLocations::Table)
                    .col(ItemLocations::ItemId)
                    .col(ItemLocations::LocationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryAdjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryAdjustments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::ItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::LocationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryAdjustments::Kind).string().not_null())
                    .col(
                        ColumnDef::new(InventoryAdjustments::QuantityBefore)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::QuantityAfter)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::QuantityChange)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryAdjustments::Reason).string().null())
                    .col(
                        ColumnDef::new(InventoryAdjustments::Reference)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(InventoryAdjustments::Notes).text().null())
                    .col(
                        ColumnDef::new(InventoryAdjustments::CreatedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_adjustments_item")
                    .table(InventoryAdjustments::Table)
                    .col(InventoryAdjustments::ItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryAdjustments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    ProductId,
    Sku,
    Name,
    Price,
    Barcode,
    TotalOnHand,
    TotalCommitted,
    TotalUnavailable,
    TotalAvailable,
    LegacyOnhand,
    LegacyCommitted,
    LegacyAvailable,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    Name,
    Kind,
    IsDefault,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ItemLocations {
    Table,
    Id,
    ItemId,
    LocationId,
    OnHand,
    Committed,
    Unavailable,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryAdjustments {
    Table,
    Id,
    ItemId,
    LocationId,
    Kind,
    QuantityBefore,
    QuantityAfter,
    QuantityChange,
    Reason,
    Reference,
    Notes,
    CreatedBy,
    CreatedAt,
}
