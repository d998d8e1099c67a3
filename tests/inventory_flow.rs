mod common;

use common::{create_item, create_location, setup};
use pos_api::services::inventory::{AdjustStockInput, TransferStockInput};
use pos_api::stock::StockStatus;
use rust_decimal_macros::dec;

#[tokio::test]
async fn adjustment_writes_audit_row_and_recomputes_totals() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let (level, adjustment) = app
        .services
        .inventory
        .adjust(AdjustStockInput {
            item_id: item,
            location_id: location,
            delta: 12,
            reason: Some("Initial count".to_string()),
            reference: None,
            notes: None,
            created_by: Some("tester".to_string()),
        })
        .await
        .expect("adjust");

    assert_eq!(level.on_hand, 12);
    assert_eq!(adjustment.quantity_before, 0);
    assert_eq!(adjustment.quantity_after, 12);
    assert_eq!(adjustment.quantity_change, 12);
    assert_eq!(adjustment.kind, "adjustment");

    // The flat totals cache was updated in the same transaction.
    let view = app.services.inventory.item_stock(item).await.expect("stock");
    assert_eq!(view.total_on_hand, 12);
    assert_eq!(view.total_available, 12);
    assert_eq!(view.status, StockStatus::InStock);

    let stored = app.services.products.get_item(item).await.expect("item");
    assert_eq!(stored.total_on_hand, Some(12));
    assert_eq!(stored.total_available, Some(12));
}

#[tokio::test]
async fn zero_delta_adjustment_is_rejected() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let result = app
        .services
        .inventory
        .adjust(AdjustStockInput {
            item_id: item,
            location_id: location,
            delta: 0,
            reason: None,
            reference: None,
            notes: None,
            created_by: None,
        })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn negative_available_is_preserved_as_oversell() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    app.services
        .inventory
        .adjust(AdjustStockInput {
            item_id: item,
            location_id: location,
            delta: -3,
            reason: None,
            reference: None,
            notes: None,
            created_by: None,
        })
        .await
        .expect("adjust below zero");

    let view = app.services.inventory.item_stock(item).await.expect("stock");
    assert_eq!(view.total_on_hand, -3);
    assert_eq!(view.total_available, -3);
    // Negative classifies as in-stock; the raw number is the signal.
    assert_eq!(view.status, StockStatus::InStock);
}

#[tokio::test]
async fn transfer_moves_quantity_and_writes_two_audit_rows() {
    let app = setup().await;
    let from = create_location(&app, "Warehouse", true).await;
    let to = create_location(&app, "Shop", false).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    app.services
        .inventory
        .adjust(AdjustStockInput {
            item_id: item,
            location_id: from,
            delta: 10,
            reason: None,
            reference: None,
            notes: None,
            created_by: None,
        })
        .await
        .expect("seed stock");

    let adjustments = app
        .services
        .inventory
        .transfer(TransferStockInput {
            item_id: item,
            from_location_id: from,
            to_location_id: to,
            quantity: 4,
            reason: None,
            created_by: None,
        })
        .await
        .expect("transfer");

    assert_eq!(adjustments.len(), 2);
    assert!(adjustments.iter().all(|a| a.kind == "transfer"));
    assert_eq!(adjustments[0].quantity_change, -4);
    assert_eq!(adjustments[1].quantity_change, 4);

    let from_level = app
        .services
        .inventory
        .get_level(item, from)
        .await
        .expect("level")
        .expect("row");
    let to_level = app
        .services
        .inventory
        .get_level(item, to)
        .await
        .expect("level")
        .expect("row");
    assert_eq!(from_level.on_hand, 6);
    assert_eq!(to_level.on_hand, 4);

    // Item totals aggregate both locations.
    let view = app.services.inventory.item_stock(item).await.expect("stock");
    assert_eq!(view.total_on_hand, 10);
}

#[tokio::test]
async fn transfer_to_same_location_is_rejected() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let result = app
        .services
        .inventory
        .transfer(TransferStockInput {
            item_id: item,
            from_location_id: location,
            to_location_id: location,
            quantity: 1,
            reason: None,
            created_by: None,
        })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn set_level_records_the_delta() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item = create_item(&app, "SKU-1", dec!(10)).await;

    let (level, adjustment) = app
        .services
        .inventory
        .set_level(item, location, 25, None)
        .await
        .expect("set level");
    assert_eq!(level.on_hand, 25);
    assert_eq!(adjustment.quantity_change, 25);

    let (level, adjustment) = app
        .services
        .inventory
        .set_level(item, location, 20, None)
        .await
        .expect("set level down");
    assert_eq!(level.on_hand, 20);
    assert_eq!(adjustment.quantity_before, 25);
    assert_eq!(adjustment.quantity_after, 20);
    assert_eq!(adjustment.quantity_change, -5);
}

#[tokio::test]
async fn adjustments_list_filters_by_item() {
    let app = setup().await;
    let location = create_location(&app, "Main", true).await;
    let item_a = create_item(&app, "SKU-A", dec!(10)).await;
    let item_b = create_item(&app, "SKU-B", dec!(10)).await;

    for (item, delta) in [(item_a, 5), (item_b, 7), (item_a, -1)] {
        app.services
            .inventory
            .adjust(AdjustStockInput {
                item_id: item,
                location_id: location,
                delta,
                reason: None,
                reference: None,
                notes: None,
                created_by: None,
            })
            .await
            .expect("adjust");
    }

    let (rows, total) = app
        .services
        .inventory
        .list_adjustments(Some(item_a), 1, 50)
        .await
        .expect("list");
    assert_eq!(total, 2);
    assert!(rows.iter().all(|a| a.item_id == item_a));

    let (_, all) = app
        .services
        .inventory
        .list_adjustments(None, 1, 50)
        .await
        .expect("list all");
    assert_eq!(all, 3);
}
