use crate::{
    db::DbPool,
    entities::{
        item::{self, Entity as Item},
        option_set::{self, Entity as OptionSet},
        option_value::{self, Entity as OptionValue},
        product::{self, Entity as Product},
        product_option_set::{self, Entity as ProductOptionSet},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::inventory::unwrap_txn_error;

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255, message = "Product name cannot be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 64, message = "SKU cannot be empty"))]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Item name cannot be empty"))]
    pub name: String,
    pub price: Decimal,
    pub barcode: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemInput {
    #[validate(length(min = 1, max = 255, message = "Item name cannot be empty"))]
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub barcode: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionSetInput {
    #[validate(length(min = 1, max = 255, message = "Option set name cannot be empty"))]
    pub name: String,
    /// Values in display order.
    pub values: Vec<String>,
}

/// Catalog service: products, their sellable items, and option sets.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        input.validate()?;

        let active = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            image_url: Set(input.image_url),
            is_active: Set(true),
            ..Default::default()
        };
        let model = active
            .insert(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ProductCreated(model.id))
            .await;
        info!(product_id = %model.id, "created product");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, limit: u64) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let paginator = Product::find()
            .order_by_asc(product::Column::Name)
            .paginate(self.db.as_ref(), limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((rows, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let model = self.get(id).await?;

        let mut active: product::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        let model = active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(model.id))
            .await;
        Ok(model)
    }

    /// Deletes a product; its items and join rows go with it via cascade.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = self.get(id).await?;
        model
            .delete(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;
        info!(product_id = %id, "deleted product");
        Ok(())
    }

    /// Deletes several products in one transaction, all-or-nothing.
    #[instrument(skip(self))]
    pub async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<u64, ServiceError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let to_delete = ids.clone();
        let deleted = self
            .db
            .transaction::<_, u64, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut deleted = 0;
                    for id in to_delete {
                        let model = Product::find_by_id(id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("Product {} not found", id))
                            })?;
                        model.delete(txn).await.map_err(ServiceError::db_error)?;
                        deleted += 1;
                    }
                    Ok(deleted)
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        for id in ids {
            self.event_sender
                .send_or_log(Event::ProductDeleted(id))
                .await;
        }
        info!(deleted, "bulk-deleted products");
        Ok(deleted)
    }

    // --- Items ---

    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: CreateItemInput) -> Result<item::Model, ServiceError> {
        input.validate()?;
        // Parent must exist.
        self.get(input.product_id).await?;

        let active = item::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            sku: Set(input.sku),
            name: Set(input.name),
            price: Set(input.price),
            barcode: Set(input.barcode),
            total_on_hand: Set(Some(0)),
            total_committed: Set(Some(0)),
            total_unavailable: Set(Some(0)),
            total_available: Set(Some(0)),
            legacy_onhand: Set(None),
            legacy_committed: Set(None),
            legacy_available: Set(None),
            ..Default::default()
        };
        active
            .insert(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        Item::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        product_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<item::Model>, u64), ServiceError> {
        let mut query = Item::find().order_by_asc(item::Column::Sku);
        if let Some(product_id) = product_id {
            query = query.filter(item::Column::ProductId.eq(product_id));
        }

        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((rows, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        id: Uuid,
        input: UpdateItemInput,
    ) -> Result<item::Model, ServiceError> {
        input.validate()?;
        let model = self.get_item(id).await?;

        let mut active: item::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(barcode) = input.barcode {
            active.barcode = Set(Some(barcode));
        }
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = self.get_item(id).await?;
        model
            .delete(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        info!(item_id = %id, "deleted item");
        Ok(())
    }

    // --- Option sets ---

    /// Creates an option set with its values in one transaction.
    #[instrument(skip(self, input))]
    pub async fn create_option_set(
        &self,
        input: CreateOptionSetInput,
    ) -> Result<(option_set::Model, Vec<option_value::Model>), ServiceError> {
        input.validate()?;

        self.db
            .transaction::<_, (option_set::Model, Vec<option_value::Model>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let set = option_set::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            name: Set(input.name),
                            created_at: Set(Utc::now()),
                        };
                        let set = set.insert(txn).await.map_err(ServiceError::db_error)?;

                        let mut values = Vec::with_capacity(input.values.len());
                        for (position, value) in input.values.into_iter().enumerate() {
                            let row = option_value::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                option_set_id: Set(set.id),
                                value: Set(value),
                                position: Set(position as i32),
                                created_at: Set(Utc::now()),
                            };
                            values.push(row.insert(txn).await.map_err(ServiceError::db_error)?);
                        }

                        Ok((set, values))
                    })
                },
            )
            .await
            .map_err(unwrap_txn_error)
    }

    #[instrument(skip(self))]
    pub async fn list_option_sets(&self) -> Result<Vec<option_set::Model>, ServiceError> {
        OptionSet::find()
            .order_by_asc(option_set::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn option_set_values(
        &self,
        option_set_id: Uuid,
    ) -> Result<Vec<option_value::Model>, ServiceError> {
        OptionValue::find()
            .filter(option_value::Column::OptionSetId.eq(option_set_id))
            .order_by_asc(option_value::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_option_set(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = OptionSet::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Option set {} not found", id)))?;
        model
            .delete(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    /// Attaches an option set to a product; attaching twice is a no-op.
    #[instrument(skip(self))]
    pub async fn attach_option_set(
        &self,
        product_id: Uuid,
        option_set_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.get(product_id).await?;
        OptionSet::find_by_id(option_set_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Option set {} not found", option_set_id))
            })?;

        let exists = ProductOptionSet::find_by_id((product_id, option_set_id))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if exists {
            return Ok(());
        }

        let link = product_option_set::ActiveModel {
            product_id: Set(product_id),
            option_set_id: Set(option_set_id),
            created_at: Set(Utc::now()),
        };
        link.insert(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn detach_option_set(
        &self,
        product_id: Uuid,
        option_set_id: Uuid,
    ) -> Result<(), ServiceError> {
        ProductOptionSet::delete_by_id((product_id, option_set_id))
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    /// Option sets attached to a product.
    #[instrument(skip(self))]
    pub async fn product_option_sets(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<option_set::Model>, ServiceError> {
        let links = ProductOptionSet::find()
            .filter(product_option_set::Column::ProductId.eq(product_id))
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let ids: Vec<Uuid> = links.iter().map(|l| l.option_set_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        OptionSet::find()
            .filter(option_set::Column::Id.is_in(ids))
            .order_by_asc(option_set::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
