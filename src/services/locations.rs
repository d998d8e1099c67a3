use crate::{
    db::DbPool,
    entities::location::{self, Entity as Location, LocationKind},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::inventory::unwrap_txn_error;

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 255, message = "Location name cannot be empty"))]
    pub name: String,
    pub kind: LocationKind,
    /// When true the new location becomes the default, demoting the
    /// current one.
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationInput {
    #[validate(length(min = 1, max = 255, message = "Location name cannot be empty"))]
    pub name: Option<String>,
    pub kind: Option<LocationKind>,
    pub is_active: Option<bool>,
}

/// Service owning the `locations` table and the single-default rule:
/// exactly one location is default at any time, and the default location
/// can neither be deleted nor deactivated.
#[derive(Clone)]
pub struct LocationService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LocationService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateLocationInput) -> Result<location::Model, ServiceError> {
        input.validate()?;

        let has_any = Location::find()
            .count(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            > 0;

        // The first location is always default regardless of the flag.
        let make_default = input.is_default || !has_any;

        let model = self
            .db
            .transaction::<_, location::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    if make_default {
                        demote_current_default(txn).await?;
                    }

                    let active = location::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        name: Set(input.name),
                        kind: Set(input.kind.to_string()),
                        is_default: Set(make_default),
                        is_active: Set(true),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };
                    active.insert(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        self.event_sender
            .send_or_log(Event::LocationCreated(model.id))
            .await;
        info!(location_id = %model.id, "created location");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<location::Model, ServiceError> {
        Location::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Location {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, limit: u64) -> Result<(Vec<location::Model>, u64), ServiceError> {
        let paginator = Location::find()
            .order_by_asc(location::Column::Name)
            .paginate(self.db.as_ref(), limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((rows, total))
    }

    /// The current default location, if one exists.
    #[instrument(skip(self))]
    pub async fn get_default(&self) -> Result<Option<location::Model>, ServiceError> {
        Location::find()
            .filter(location::Column::IsDefault.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateLocationInput,
    ) -> Result<location::Model, ServiceError> {
        input.validate()?;
        let model = self.get(id).await?;

        if model.is_default && input.is_active == Some(false) {
            return Err(ServiceError::InvalidOperation(
                "The default location cannot be deactivated".to_string(),
            ));
        }

        let mut active: location::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind.to_string());
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
            .send_or_log(Event::LocationUpdated(model.id))
            .await;
        Ok(model)
    }

    /// Makes `id` the default, demoting the previous default in the same
    /// transaction so there is never zero or more than one default.
    #[instrument(skip(self))]
    pub async fn set_default(&self, id: Uuid) -> Result<location::Model, ServiceError> {
        let target = self.get(id).await?;
        if target.is_default {
            return Ok(target);
        }
        if !target.is_active {
            return Err(ServiceError::InvalidOperation(
                "An inactive location cannot be made the default".to_string(),
            ));
        }

        let old_default = self.get_default().await?.map(|l| l.id);

        let model = self
            .db
            .transaction::<_, location::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    demote_current_default(txn).await?;

                    let mut active: location::ActiveModel = target.into();
                    active.is_default = Set(true);
                    active.updated_at = Set(Some(Utc::now()));
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        self.event_sender
            .send_or_log(Event::DefaultLocationChanged {
                old_default,
                new_default: model.id,
            })
            .await;
        info!(location_id = %model.id, "changed default location");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let model = self.get(id).await?;
        if model.is_default {
            return Err(ServiceError::InvalidOperation(
                "The default location cannot be deleted".to_string(),
            ));
        }

        Location::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::LocationDeleted(id))
            .await;
        info!(location_id = %id, "deleted location");
        Ok(())
    }
}

async fn demote_current_default<C: sea_orm::ConnectionTrait>(
    txn: &C,
) -> Result<(), ServiceError> {
    let current = Location::find()
        .filter(location::Column::IsDefault.eq(true))
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;

    if let Some(current) = current {
        let mut active: location::ActiveModel = current.into();
        active.is_default = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(txn).await.map_err(ServiceError::db_error)?;
    }
    Ok(())
}
