use crate::{
    db::DbPool,
    entities::{
        collection::{self, Entity as Collection},
        collection_product::{self, Entity as CollectionProduct},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
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
pub struct CreateCollectionInput {
    #[validate(length(min = 1, max = 255, message = "Collection name cannot be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCollectionInput {
    #[validate(length(min = 1, max = 255, message = "Collection name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Merchandising service: collections and their product membership.
#[derive(Clone)]
pub struct CollectionService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CollectionService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateCollectionInput,
    ) -> Result<collection::Model, ServiceError> {
        input.validate()?;

        let active = collection::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            image_url: Set(input.image_url),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let model = active
            .insert(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CollectionCreated(model.id))
            .await;
        info!(collection_id = %model.id, "created collection");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<collection::Model, ServiceError> {
        Collection::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Collection {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<collection::Model>, u64), ServiceError> {
        let paginator = Collection::find()
            .order_by_asc(collection::Column::Name)
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
        input: UpdateCollectionInput,
    ) -> Result<collection::Model, ServiceError> {
        input.validate()?;
        let model = self.get(id).await?;

        let mut active: collection::ActiveModel = model.into();
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
            .send_or_log(Event::CollectionUpdated(model.id))
            .await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = self.get(id).await?;
        model
            .delete(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::CollectionDeleted(id))
            .await;
        info!(collection_id = %id, "deleted collection");
        Ok(())
    }

    /// Links a product into a collection; linking twice is a no-op.
    #[instrument(skip(self))]
    pub async fn link_product(
        &self,
        collection_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.get(collection_id).await?;
        Product::find_by_id(product_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let exists = CollectionProduct::find_by_id((collection_id, product_id))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .is_some();
        if exists {
            return Ok(());
        }

        let link = collection_product::ActiveModel {
            collection_id: Set(collection_id),
            product_id: Set(product_id),
            created_at: Set(Utc::now()),
        };
        link.insert(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unlink_product(
        &self,
        collection_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        CollectionProduct::delete_by_id((collection_id, product_id))
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    /// Replaces or extends a collection's membership with a set of
    /// products in one transaction, all-or-nothing. Every product must
    /// exist or nothing is linked.
    #[instrument(skip(self))]
    pub async fn bulk_assign(
        &self,
        collection_id: Uuid,
        product_ids: Vec<Uuid>,
    ) -> Result<usize, ServiceError> {
        self.get(collection_id).await?;
        if product_ids.is_empty() {
            return Ok(0);
        }

        let ids = product_ids.clone();
        let linked = self
            .db
            .transaction::<_, usize, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut linked = 0;
                    for product_id in ids {
                        Product::find_by_id(product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    product_id
                                ))
                            })?;

                        let exists = CollectionProduct::find_by_id((collection_id, product_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .is_some();
                        if exists {
                            continue;
                        }

                        let link = collection_product::ActiveModel {
                            collection_id: Set(collection_id),
                            product_id: Set(product_id),
                            created_at: Set(Utc::now()),
                        };
                        link.insert(txn).await.map_err(ServiceError::db_error)?;
                        linked += 1;
                    }
                    Ok(linked)
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        self.event_sender
            .send_or_log(Event::ProductsLinkedToCollection {
                collection_id,
                product_count: linked,
            })
            .await;
        info!(collection_id = %collection_id, linked, "bulk-assigned products to collection");
        Ok(linked)
    }

    /// Products belonging to a collection, via the join table.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        collection_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let collection = self.get(collection_id).await?;
        collection
            .find_related(Product)
            .order_by_asc(product::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
