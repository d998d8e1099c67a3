use crate::{
    db::DbPool,
    entities::{
        inventory_adjustment::AdjustmentKind,
        item::Entity as Item,
        order::{self, Entity as Order, OrderStatus},
        order_item::{self, Entity as OrderItem},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    kv::{KvStore, LAST_ORDER_NUMBER_KEY},
    order_math::{self, DiscountSettings, LineInput, ShippingSettings, TaxSettings},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    inventory::{apply_stock_change, unwrap_txn_error, StockChange, StockField},
    locations::LocationService,
};

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct CreateOrderInput {
    pub lines: Vec<OrderLineInput>,
    /// Location the stock is committed against; the default location is
    /// used when absent.
    pub location_id: Option<Uuid>,
    pub discount: Option<DiscountSettings>,
    pub shipping: Option<ShippingSettings>,
    pub tax: Option<TaxSettings>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// An order header with its line items.
#[derive(Clone, Debug, serde::Serialize, ToSchema)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: order::Model,
    pub lines: Vec<order_item::Model>,
}

/// Service owning order creation and status transitions.
///
/// Creating an order writes the header, its lines, and one `sale` stock
/// commit per line in a single transaction, so an order can never exist
/// without its inventory effect.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    kv: Arc<dyn KvStore>,
    locations: LocationService,
    order_number_prefix: String,
    currency: String,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        kv: Arc<dyn KvStore>,
        locations: LocationService,
        order_number_prefix: String,
        currency: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            kv,
            locations,
            order_number_prefix,
            currency,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<OrderWithLines, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::InvalidInput(
                "An order needs at least one line".to_string(),
            ));
        }
        if input.lines.iter().any(|l| l.quantity <= 0) {
            return Err(ServiceError::InvalidInput(
                "Line quantities must be positive".to_string(),
            ));
        }

        let location_id = match input.location_id {
            Some(id) => {
                // Validates existence up front.
                self.locations.get(id).await?.id
            }
            None => self
                .locations
                .get_default()
                .await?
                .map(|l| l.id)
                .ok_or_else(|| {
                    ServiceError::InvalidOperation(
                        "No location given and no default location configured".to_string(),
                    )
                })?,
        };

        // Line prices come from the items at creation time.
        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = Item::find_by_id(line.item_id)
                .one(self.db.as_ref())
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Item {} not found", line.item_id))
                })?;
            items.push((item, line.quantity));
        }

        let math_lines: Vec<LineInput> = items
            .iter()
            .map(|(item, quantity)| LineInput {
                unit_price: item.price,
                quantity: *quantity,
            })
            .collect();
        let totals = order_math::calculate_totals(
            &math_lines,
            input.discount.as_ref(),
            input.shipping.as_ref(),
            input.tax.as_ref(),
        );

        let last = self.kv.get(LAST_ORDER_NUMBER_KEY).await?;
        let order_number =
            order_math::generate_order_number(&self.order_number_prefix, last.as_deref());

        let currency = self.currency.clone();
        let notes = input.notes.clone();
        let created_by = input.created_by.clone();
        let number_for_txn = order_number.clone();

        let created = self
            .db
            .transaction::<_, OrderWithLines, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order_id = Uuid::new_v4();
                    let header = order::ActiveModel {
                        id: Set(order_id),
                        order_number: Set(number_for_txn.clone()),
                        status: Set(OrderStatus::Open.to_string()),
                        subtotal: Set(totals.subtotal),
                        discount_amount: Set(totals.discount_amount),
                        shipping_amount: Set(totals.shipping_amount),
                        tax_amount: Set(totals.tax_amount),
                        total_amount: Set(totals.total),
                        currency: Set(currency),
                        notes: Set(notes),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };
                    let header = header.insert(txn).await.map_err(|e| {
                        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                            ServiceError::Conflict(format!(
                                "Order number {} already exists",
                                number_for_txn
                            ))
                        } else {
                            ServiceError::db_error(e)
                        }
                    })?;

                    let mut lines = Vec::with_capacity(items.len());
                    for (item, quantity) in &items {
                        let line = order_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(order_id),
                            item_id: Set(item.id),
                            sku: Set(item.sku.clone()),
                            name: Set(item.name.clone()),
                            quantity: Set(*quantity),
                            unit_price: Set(item.price),
                            line_total: Set(item.price * rust_decimal::Decimal::from(*quantity)),
                            ..Default::default()
                        };
                        lines.push(line.insert(txn).await.map_err(ServiceError::db_error)?);

                        apply_stock_change(
                            txn,
                            StockChange {
                                item_id: item.id,
                                location_id,
                                field: StockField::Committed,
                                delta: *quantity,
                                kind: AdjustmentKind::Sale,
                                reason: None,
                                reference: Some(number_for_txn.clone()),
                                notes: None,
                                created_by: created_by.clone(),
                            },
                        )
                        .await?;
                    }

                    Ok(OrderWithLines {
                        order: header,
                        lines,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        // Stored after commit; on failure the stale value just makes the
        // next generation collide with the unique index instead.
        self.kv.set(LAST_ORDER_NUMBER_KEY, &order_number).await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(created.order.id))
            .await;
        info!(order_id = %created.order.id, order_number = %order_number, "created order");

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<OrderWithLines, ServiceError> {
        let order = Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let lines = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(OrderWithLines { order, lines })
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let mut query = Order::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((rows, total))
    }

    /// Moves an order to a new status. Terminal states (`completed`,
    /// `cancelled`) cannot transition further.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let current = OrderStatus::from_str(&order.status)
            .map_err(|_| ServiceError::InternalError(format!("Bad order status: {}", order.status)))?;

        if current == new_status {
            return Ok(order);
        }
        if current != OrderStatus::Open {
            return Err(ServiceError::InvalidOperation(format!(
                "Order is {} and cannot change status",
                current
            )));
        }

        let old_status = order.status.clone();
        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let order = active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id: order.id,
                old_status,
                new_status: new_status.to_string(),
            })
            .await;
        Ok(order)
    }
}
