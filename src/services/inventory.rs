use crate::{
    db::DbPool,
    entities::{
        inventory_adjustment::{self, AdjustmentKind, Entity as InventoryAdjustment},
        item::{self, Entity as Item},
        item_location::{self, Entity as ItemLocation},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    legacy, stock,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Which per-location counter a stock change applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockField {
    OnHand,
    Committed,
    Unavailable,
}

/// Input for a manual stock adjustment.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AdjustStockInput {
    pub item_id: Uuid,
    pub location_id: Uuid,
    /// Signed change applied to the on-hand counter.
    pub delta: i32,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Input for moving quantity between two locations of the same item.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct TransferStockInput {
    pub item_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: i32,
    pub reason: Option<String>,
    pub created_by: Option<String>,
}

/// Stock view for one item, aggregated over its per-location rows.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ItemStockView {
    pub item_id: Uuid,
    pub sku: String,
    pub total_on_hand: i32,
    pub total_committed: i32,
    pub total_unavailable: i32,
    pub total_available: i32,
    pub status: stock::StockStatus,
    pub locations: Vec<item_location::Model>,
}

/// Service for per-location stock counters and their audit trail.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Current stock for an item across all locations, with the derived
    /// available and status.
    #[instrument(skip(self))]
    pub async fn item_stock(&self, item_id: Uuid) -> Result<ItemStockView, ServiceError> {
        let db = self.db.as_ref();

        let item = Item::find_by_id(item_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

        let rows = ItemLocation::find()
            .filter(item_location::Column::ItemId.eq(item_id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let total_available = stock::total_available(&item, &rows);

        // Items without per-location rows are read through the flat-field
        // normalization, so pre-migration records report their real
        // numbers rather than zeroes.
        let (total_on_hand, total_committed, total_unavailable) = if rows.is_empty() {
            let flat = legacy::normalize(&item);
            (flat.on_hand, flat.committed, flat.unavailable)
        } else {
            (
                rows.iter().map(|r| r.on_hand).sum(),
                rows.iter().map(|r| r.committed).sum(),
                rows.iter().map(|r| r.unavailable).sum(),
            )
        };

        Ok(ItemStockView {
            item_id,
            sku: item.sku,
            total_on_hand,
            total_committed,
            total_unavailable,
            total_available,
            status: stock::stock_status(total_available),
            locations: rows,
        })
    }

    /// Stock row for one item at one location, if any.
    #[instrument(skip(self))]
    pub async fn get_level(
        &self,
        item_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<item_location::Model>, ServiceError> {
        ItemLocation::find()
            .filter(item_location::Column::ItemId.eq(item_id))
            .filter(item_location::Column::LocationId.eq(location_id))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Applies a signed on-hand adjustment and writes the audit record in
    /// the same transaction.
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        input: AdjustStockInput,
    ) -> Result<(item_location::Model, inventory_adjustment::Model), ServiceError> {
        if input.delta == 0 {
            return Err(ServiceError::InvalidInput(
                "Adjustment delta cannot be zero".to_string(),
            ));
        }

        let moved = input.clone();
        let (row, adjustment) = self
            .db
            .transaction::<_, (item_location::Model, inventory_adjustment::Model), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        apply_stock_change(
                            txn,
                            StockChange {
                                item_id: moved.item_id,
                                location_id: moved.location_id,
                                field: StockField::OnHand,
                                delta: moved.delta,
                                kind: AdjustmentKind::Adjustment,
                                reason: moved.reason,
                                reference: moved.reference,
                                notes: moved.notes,
                                created_by: moved.created_by,
                            },
                        )
                        .await
                    })
                },
            )
            .await
            .map_err(unwrap_txn_error)?;

        self.event_sender
            .send_or_log(Event::InventoryAdjusted {
                item_id: input.item_id,
                location_id: input.location_id,
                quantity_before: adjustment.quantity_before,
                quantity_after: adjustment.quantity_after,
                kind: adjustment.kind.clone(),
                adjustment_id: adjustment.id,
            })
            .await;

        info!(
            item_id = %input.item_id, location_id = %input.location_id, delta = input.delta,
            "adjusted stock"
        );

        Ok((row, adjustment))
    }

    /// Sets the on-hand counter to an absolute value, expressed internally
    /// as a delta so the audit trail still records before/after/change.
    #[instrument(skip(self))]
    pub async fn set_level(
        &self,
        item_id: Uuid,
        location_id: Uuid,
        new_on_hand: i32,
        created_by: Option<String>,
    ) -> Result<(item_location::Model, inventory_adjustment::Model), ServiceError> {
        let current = self
            .get_level(item_id, location_id)
            .await?
            .map(|row| row.on_hand)
            .unwrap_or(0);

        let delta = new_on_hand - current;
        if delta == 0 {
            return Err(ServiceError::InvalidOperation(
                "On-hand quantity is already at the requested level".to_string(),
            ));
        }

        self.adjust(AdjustStockInput {
            item_id,
            location_id,
            delta,
            reason: Some("Set level".to_string()),
            reference: None,
            notes: None,
            created_by,
        })
        .await
    }

    /// Moves quantity between two locations as one transaction producing
    /// two audit rows.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        input: TransferStockInput,
    ) -> Result<Vec<inventory_adjustment::Model>, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "Transfer quantity must be positive".to_string(),
            ));
        }
        if input.from_location_id == input.to_location_id {
            return Err(ServiceError::InvalidOperation(
                "Cannot transfer stock to the same location".to_string(),
            ));
        }

        let moved = input.clone();
        let adjustments = self
            .db
            .transaction::<_, Vec<inventory_adjustment::Model>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let reference = moved.reason.clone();
                    let (_, out) = apply_stock_change(
                        txn,
                        StockChange {
                            item_id: moved.item_id,
                            location_id: moved.from_location_id,
                            field: StockField::OnHand,
                            delta: -moved.quantity,
                            kind: AdjustmentKind::Transfer,
                            reason: reference.clone(),
                            reference: None,
                            notes: Some(format!("Transfer to {}", moved.to_location_id)),
                            created_by: moved.created_by.clone(),
                        },
                    )
                    .await?;

                    let (_, into) = apply_stock_change(
                        txn,
                        StockChange {
                            item_id: moved.item_id,
                            location_id: moved.to_location_id,
                            field: StockField::OnHand,
                            delta: moved.quantity,
                            kind: AdjustmentKind::Transfer,
                            reason: reference,
                            reference: None,
                            notes: Some(format!("Transfer from {}", moved.from_location_id)),
                            created_by: moved.created_by,
                        },
                    )
                    .await?;

                    Ok(vec![out, into])
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        self.event_sender
            .send_or_log(Event::InventoryTransferred {
                item_id: input.item_id,
                from_location_id: input.from_location_id,
                to_location_id: input.to_location_id,
                quantity: input.quantity,
            })
            .await;

        Ok(adjustments)
    }

    /// Lists audit records, optionally filtered to one item, newest first.
    #[instrument(skip(self))]
    pub async fn list_adjustments(
        &self,
        item_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_adjustment::Model>, u64), ServiceError> {
        let mut query = InventoryAdjustment::find()
            .order_by_desc(inventory_adjustment::Column::CreatedAt);
        if let Some(item_id) = item_id {
            query = query.filter(inventory_adjustment::Column::ItemId.eq(item_id));
        }

        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((rows, total))
    }
}

/// One stock change against a single (item, location) counter.
#[derive(Clone, Debug)]
pub(crate) struct StockChange {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub field: StockField,
    pub delta: i32,
    pub kind: AdjustmentKind,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Applies one counter change inside an open transaction: updates (or
/// creates) the per-location row, recomputes the item's aggregate totals
/// from all of its rows, and appends the immutable audit record.
///
/// No clamping: counters may go negative and that is preserved as oversell
/// signal.
pub(crate) async fn apply_stock_change<C: ConnectionTrait>(
    txn: &C,
    change: StockChange,
) -> Result<(item_location::Model, inventory_adjustment::Model), ServiceError> {
    let existing = ItemLocation::find()
        .filter(item_location::Column::ItemId.eq(change.item_id))
        .filter(item_location::Column::LocationId.eq(change.location_id))
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?;

    let (before, row) = match existing {
        Some(row) => {
            let before = counter_value(&row, change.field);
            let mut active: item_location::ActiveModel = row.into();
            match change.field {
                StockField::OnHand => active.on_hand = Set(before + change.delta),
                StockField::Committed => active.committed = Set(before + change.delta),
                StockField::Unavailable => active.unavailable = Set(before + change.delta),
            }
            active.updated_at = Set(Some(Utc::now()));
            let row = active.update(txn).await.map_err(ServiceError::db_error)?;
            (before, row)
        }
        None => {
            let mut active = item_location::ActiveModel {
                id: Set(Uuid::new_v4()),
                item_id: Set(change.item_id),
                location_id: Set(change.location_id),
                on_hand: Set(0),
                committed: Set(0),
                unavailable: Set(0),
                ..Default::default()
            };
            match change.field {
                StockField::OnHand => active.on_hand = Set(change.delta),
                StockField::Committed => active.committed = Set(change.delta),
                StockField::Unavailable => active.unavailable = Set(change.delta),
            }
            let row = active.insert(txn).await.map_err(ServiceError::db_error)?;
            (0, row)
        }
    };

    recompute_item_totals(txn, change.item_id).await?;

    let after = counter_value(&row, change.field);
    let adjustment = inventory_adjustment::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(change.item_id),
        location_id: Set(change.location_id),
        kind: Set(change.kind.to_string()),
        quantity_before: Set(before),
        quantity_after: Set(after),
        quantity_change: Set(change.delta),
        reason: Set(change.reason),
        reference: Set(change.reference),
        notes: Set(change.notes),
        created_by: Set(change.created_by),
        created_at: Set(Utc::now()),
    };
    let adjustment = adjustment
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok((row, adjustment))
}

fn counter_value(row: &item_location::Model, field: StockField) -> i32 {
    match field {
        StockField::OnHand => row.on_hand,
        StockField::Committed => row.committed,
        StockField::Unavailable => row.unavailable,
    }
}

/// Recomputes the item's aggregate totals cache from all of its
/// per-location rows. Called inside every adjusting transaction so the
/// flat fields can never drift from the rows on the write path.
pub(crate) async fn recompute_item_totals<C: ConnectionTrait>(
    txn: &C,
    item_id: Uuid,
) -> Result<item::Model, ServiceError> {
    let item = Item::find_by_id(item_id)
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

    let rows = ItemLocation::find()
        .filter(item_location::Column::ItemId.eq(item_id))
        .all(txn)
        .await
        .map_err(ServiceError::db_error)?;

    let on_hand: i32 = rows.iter().map(|r| r.on_hand).sum();
    let committed: i32 = rows.iter().map(|r| r.committed).sum();
    let unavailable: i32 = rows.iter().map(|r| r.unavailable).sum();
    let available: i32 = rows.iter().map(stock::location_available).sum();

    let mut active: item::ActiveModel = item.into();
    active.total_on_hand = Set(Some(on_hand));
    active.total_committed = Set(Some(committed));
    active.total_unavailable = Set(Some(unavailable));
    active.total_available = Set(Some(available));
    active.updated_at = Set(Some(Utc::now()));

    active.update(txn).await.map_err(ServiceError::db_error)
}

pub(crate) fn unwrap_txn_error(e: TransactionError<ServiceError>) -> ServiceError {
    match e {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
