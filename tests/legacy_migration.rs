mod common;

use chrono::Utc;
use common::{create_item, setup};
use pos_api::entities::item;
use pos_api::legacy::MigrationState;
use pos_api::stock::StockStatus;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

/// Seeds an item row carrying only the deprecated flat stock fields, as
/// an import from the old schema would look.
async fn seed_legacy_item(app: &common::TestApp, sku: &str, onhand: i32, committed: i32) -> Uuid {
    let product = app
        .services
        .products
        .create(pos_api::services::products::CreateProductInput {
            name: format!("Legacy {}", sku),
            description: None,
            image_url: None,
        })
        .await
        .expect("product");

    let model = item::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        sku: Set(sku.to_string()),
        name: Set(format!("Legacy item {}", sku)),
        price: Set(dec!(1)),
        barcode: Set(None),
        total_on_hand: Set(None),
        total_committed: Set(None),
        total_unavailable: Set(None),
        total_available: Set(None),
        legacy_onhand: Set(Some(onhand)),
        legacy_committed: Set(Some(committed)),
        legacy_available: Set(Some(onhand - committed)),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    };
    model.insert(app.db.as_ref()).await.expect("legacy item").id
}

#[tokio::test]
async fn run_backfills_only_unmigrated_records() {
    let app = setup().await;
    let legacy = seed_legacy_item(&app, "OLD-1", 12, 3).await;
    // A freshly created item already has the new fields.
    create_item(&app, "NEW-1", dec!(10)).await;

    let report = app.services.legacy.run().await.expect("run");
    assert_eq!(report.scanned, 2);
    assert_eq!(report.patched, 1);
    assert_eq!(report.skipped, 1);

    let migrated = item::Entity::find_by_id(legacy)
        .one(app.db.as_ref())
        .await
        .expect("query")
        .expect("row");
    assert_eq!(migrated.total_on_hand, Some(12));
    assert_eq!(migrated.total_committed, Some(3));
    assert_eq!(migrated.total_available, Some(9));
    // Legacy fields survive until cleanup.
    assert_eq!(migrated.legacy_onhand, Some(12));
}

#[tokio::test]
async fn stock_view_reads_legacy_fields_before_backfill() {
    let app = setup().await;
    let legacy = seed_legacy_item(&app, "OLD-1", 12, 3).await;

    // No per-location rows exist yet, so the view resolves the item's
    // flat fields, falling back to the deprecated ones.
    let view = app
        .services
        .inventory
        .item_stock(legacy)
        .await
        .expect("stock view");
    assert_eq!(view.total_on_hand, 12);
    assert_eq!(view.total_committed, 3);
    assert_eq!(view.total_available, 9);
    assert_eq!(view.status, StockStatus::InStock);
    assert!(view.locations.is_empty());
}

#[tokio::test]
async fn run_is_idempotent() {
    let app = setup().await;
    seed_legacy_item(&app, "OLD-1", 5, 0).await;

    let first = app.services.legacy.run().await.expect("first run");
    assert_eq!(first.patched, 1);

    let second = app.services.legacy.run().await.expect("second run");
    assert_eq!(second.patched, 0);
    assert_eq!(second.skipped, second.scanned);
}

#[tokio::test]
async fn cleanup_nulls_legacy_fields_only_after_backfill() {
    let app = setup().await;
    let migrated = seed_legacy_item(&app, "OLD-1", 8, 2).await;
    let untouched = seed_legacy_item(&app, "OLD-2", 4, 0).await;

    app.services.legacy.run().await.expect("run");

    // Simulate a record the backfill missed: strip its new fields again.
    let row = item::Entity::find_by_id(untouched)
        .one(app.db.as_ref())
        .await
        .expect("query")
        .expect("row");
    let mut active: item::ActiveModel = row.into();
    active.total_on_hand = Set(None);
    active.total_committed = Set(None);
    active.total_available = Set(None);
    active.update(app.db.as_ref()).await.expect("strip");

    let report = app.services.legacy.cleanup().await.expect("cleanup");
    assert_eq!(report.cleaned, 1);

    let cleaned = item::Entity::find_by_id(migrated)
        .one(app.db.as_ref())
        .await
        .expect("query")
        .expect("row");
    assert_eq!(cleaned.legacy_onhand, None);
    assert_eq!(cleaned.total_on_hand, Some(8));

    // The un-migrated record keeps its legacy data.
    let kept = item::Entity::find_by_id(untouched)
        .one(app.db.as_ref())
        .await
        .expect("query")
        .expect("row");
    assert_eq!(kept.legacy_onhand, Some(4));
}

#[tokio::test]
async fn verify_classifies_each_record() {
    let app = setup().await;
    create_item(&app, "NEW-1", dec!(10)).await;
    let with_legacy = seed_legacy_item(&app, "OLD-1", 3, 1).await;
    let not_migrated = seed_legacy_item(&app, "OLD-2", 7, 0).await;

    // Backfill OLD-1 only, leaving its legacy fields in place.
    let row = item::Entity::find_by_id(with_legacy)
        .one(app.db.as_ref())
        .await
        .expect("query")
        .expect("row");
    let mut active: item::ActiveModel = row.into();
    active.total_on_hand = Set(Some(3));
    active.total_committed = Set(Some(1));
    active.total_available = Set(Some(2));
    active.update(app.db.as_ref()).await.expect("patch");

    let report = app.services.legacy.verify().await.expect("verify");
    assert_eq!(report.scanned, 3);
    assert_eq!(report.fully_migrated, 1);
    assert_eq!(report.has_legacy_data, 1);
    assert_eq!(report.not_migrated, 1);
    assert_eq!(report.partially_migrated, 0);

    assert_eq!(report.flagged.len(), 2);
    assert!(report
        .flagged
        .iter()
        .any(|f| f.item_id == with_legacy && f.state == MigrationState::HasLegacyData));
    assert!(report
        .flagged
        .iter()
        .any(|f| f.item_id == not_migrated && f.state == MigrationState::NotMigrated));
}
