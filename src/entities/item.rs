use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Sellable variant (SKU) belonging to a product.
///
/// The `total_*` columns are an aggregate cache of this item's
/// `item_locations` rows and are recomputed inside every adjusting
/// transaction; they are nullable because records imported from the legacy
/// schema may not have them yet. The `legacy_*` columns are the deprecated
/// flat stock fields from before per-location tracking; they stay populated
/// only on rows the legacy migration has not yet processed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    #[validate(length(min = 1, max = 64, message = "SKU cannot be empty"))]
    pub sku: String,

    #[validate(length(min = 1, max = 255, message = "Item name cannot be empty"))]
    pub name: String,

    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,

    pub barcode: Option<String>,

    pub total_on_hand: Option<i32>,
    pub total_committed: Option<i32>,
    pub total_unavailable: Option<i32>,
    pub total_available: Option<i32>,

    pub legacy_onhand: Option<i32>,
    pub legacy_committed: Option<i32>,
    pub legacy_available: Option<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(has_many = "super::item_location::Entity")]
    ItemLocations,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::item_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemLocations.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }
        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
