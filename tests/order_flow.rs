mod common;

use common::{create_item, create_location, setup};
use pos_api::entities::order::OrderStatus;
use pos_api::errors::ServiceError;
use pos_api::kv::{DbKvStore, KvStore, LAST_ORDER_NUMBER_KEY};
use pos_api::order_math::{DiscountKind, DiscountSettings, ShippingSettings, TaxMode, TaxSettings};
use pos_api::services::orders::{CreateOrderInput, OrderLineInput};
use rust_decimal_macros::dec;

fn order_input(lines: Vec<OrderLineInput>) -> CreateOrderInput {
    CreateOrderInput {
        lines,
        location_id: None,
        discount: None,
        shipping: None,
        tax: None,
        notes: None,
        created_by: None,
    }
}

#[tokio::test]
async fn order_persists_computed_totals() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let ten = create_item(&app, "SKU-10", dec!(10)).await;
    let five = create_item(&app, "SKU-5", dec!(5)).await;

    let created = app
        .services
        .orders
        .create_order(CreateOrderInput {
            lines: vec![
                OrderLineInput {
                    item_id: ten,
                    quantity: 2,
                },
                OrderLineInput {
                    item_id: five,
                    quantity: 1,
                },
            ],
            location_id: None,
            discount: Some(DiscountSettings {
                kind: DiscountKind::Percentage,
                value: dec!(10),
                minimum_amount: None,
                maximum_discount: None,
            }),
            shipping: Some(ShippingSettings {
                amount: dec!(5),
                free_above: None,
            }),
            tax: Some(TaxSettings {
                rate: dec!(8.5),
                mode: TaxMode::Exclusive,
            }),
            notes: None,
            created_by: None,
        })
        .await
        .expect("create order");

    assert_eq!(created.order.subtotal, dec!(25));
    assert_eq!(created.order.discount_amount, dec!(2.5));
    assert_eq!(created.order.shipping_amount, dec!(5));
    assert_eq!(created.order.tax_amount, dec!(2.3375));
    assert_eq!(created.order.total_amount, dec!(29.8375));
    assert_eq!(created.lines.len(), 2);
    assert_eq!(created.order.status, "open");
    assert_eq!(created.order.currency, "USD");
}

#[tokio::test]
async fn order_numbers_start_at_1001_and_increment() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let first = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("first order");
    assert_eq!(first.order.order_number, "#1001");

    let second = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("second order");
    assert_eq!(second.order.order_number, "#1002");
}

#[tokio::test]
async fn stale_last_order_number_surfaces_as_conflict() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let first = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("first order");
    assert_eq!(first.order.order_number, "#1001");

    // Rewind the stored last number, as if the write after commit was
    // lost. The next generation collides with the unique index on
    // order_number instead of silently duplicating it.
    let kv = DbKvStore::new(app.db.clone());
    kv.set(LAST_ORDER_NUMBER_KEY, "#1000").await.expect("rewind");

    let result = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    // The failed attempt wrote nothing.
    let (_, total) = app
        .services
        .orders
        .list_orders(None, 1, 10)
        .await
        .expect("list");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn order_commits_stock_at_the_default_location() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let created = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 3,
        }]))
        .await
        .expect("create order");

    let level = app
        .services
        .inventory
        .get_level(item, location)
        .await
        .expect("level")
        .expect("row");
    assert_eq!(level.committed, 3);

    // The sale audit row references the order number.
    let (adjustments, _) = app
        .services
        .inventory
        .list_adjustments(Some(item), 1, 10)
        .await
        .expect("adjustments");
    assert_eq!(adjustments.len(), 1);
    assert_eq!(adjustments[0].kind, "sale");
    assert_eq!(
        adjustments[0].reference.as_deref(),
        Some(created.order.order_number.as_str())
    );

    // Committed stock reduces availability.
    let view = app.services.inventory.item_stock(item).await.expect("stock");
    assert_eq!(view.total_committed, 3);
    assert_eq!(view.total_available, -3);
}

#[tokio::test]
async fn order_without_any_location_fails() {
    let app = setup().await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let result = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await;
    assert!(result.is_err());

    // Nothing was written.
    let (orders, total) = app
        .services
        .orders
        .list_orders(None, 1, 10)
        .await
        .expect("list");
    assert!(orders.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let app = setup().await;
    create_location(&app, "Main", true).await;

    assert!(app
        .services
        .orders
        .create_order(order_input(vec![]))
        .await
        .is_err());
}

#[tokio::test]
async fn status_transitions_from_open_are_terminal() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let created = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("create order");

    let completed = app
        .services
        .orders
        .update_status(created.order.id, OrderStatus::Completed)
        .await
        .expect("complete");
    assert_eq!(completed.status, "completed");

    // Terminal states cannot transition further.
    assert!(app
        .services
        .orders
        .update_status(created.order.id, OrderStatus::Cancelled)
        .await
        .is_err());
}

#[tokio::test]
async fn list_orders_filters_by_status() {
    let app = setup().await;
    create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let a = app
        .services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("order a");
    app.services
        .orders
        .create_order(order_input(vec![OrderLineInput {
            item_id: item,
            quantity: 1,
        }]))
        .await
        .expect("order b");

    app.services
        .orders
        .update_status(a.order.id, OrderStatus::Completed)
        .await
        .expect("complete a");

    let (open, total) = app
        .services
        .orders
        .list_orders(Some(OrderStatus::Open), 1, 10)
        .await
        .expect("list open");
    assert_eq!(total, 1);
    assert_eq!(open[0].status, "open");
}
