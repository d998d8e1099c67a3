//! Pure stock-counter arithmetic shared by the inventory service and the
//! read-side handlers.
//!
//! None of these functions validate their inputs or clamp results: a
//! negative available quantity is a valid oversell signal, not an error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{item, item_location};

/// Available quantities strictly below this (and above zero) classify as
/// low stock. The boundary is inclusive at the threshold: exactly 5 is in
/// stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Derived available quantity: `on_hand - committed - unavailable`.
pub fn available(on_hand: i32, committed: i32, unavailable: i32) -> i32 {
    on_hand - committed - unavailable
}

/// Same as [`available`] but coalescing missing counters to zero, for raw
/// records where the numeric fields may be absent.
pub fn available_or_zero(
    on_hand: Option<i32>,
    committed: Option<i32>,
    unavailable: Option<i32>,
) -> i32 {
    available(
        on_hand.unwrap_or(0),
        committed.unwrap_or(0),
        unavailable.unwrap_or(0),
    )
}

/// Available quantity for a single per-location stock row.
pub fn location_available(row: &item_location::Model) -> i32 {
    available(row.on_hand, row.committed, row.unavailable)
}

/// Total available quantity for an item.
///
/// When per-location rows exist their derived availables are summed;
/// otherwise the item's own flat fields are read through
/// [`crate::legacy::normalize`], so rows that predate per-location
/// tracking (stock only in the deprecated flat fields) still report their
/// real numbers. The two representations can diverge and no
/// reconciliation happens here.
pub fn total_available(item: &item::Model, rows: &[item_location::Model]) -> i32 {
    if rows.is_empty() {
        crate::legacy::normalize(item).available
    } else {
        rows.iter().map(location_available).sum()
    }
}

/// Coarse classification of an available quantity for display and
/// low-stock filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

/// Classify an available quantity. Only exactly zero is out of stock;
/// negative quantities fall through to [`StockStatus::InStock`] and are
/// surfaced as oversell by the raw number itself.
pub fn stock_status(available: i32) -> StockStatus {
    if available == 0 {
        StockStatus::OutOfStock
    } else if available > 0 && available < LOW_STOCK_THRESHOLD {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn row(on_hand: i32, committed: i32, unavailable: i32) -> item_location::Model {
        item_location::Model {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            on_hand,
            committed,
            unavailable,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn item_with_flat_total(flat: i32) -> item::Model {
        item::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU-1".into(),
            name: "Test item".into(),
            price: Decimal::ZERO,
            barcode: None,
            total_on_hand: Some(0),
            total_committed: Some(0),
            total_unavailable: Some(0),
            total_available: Some(flat),
            legacy_onhand: None,
            legacy_committed: None,
            legacy_available: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn available_basic() {
        assert_eq!(available(10, 3, 1), 6);
    }

    #[test]
    fn available_can_go_negative() {
        assert_eq!(available(2, 5, 0), -3);
    }

    #[test]
    fn available_coalesces_missing_fields() {
        assert_eq!(available_or_zero(Some(7), None, None), 7);
        assert_eq!(available_or_zero(None, None, None), 0);
        assert_eq!(available_or_zero(None, Some(4), Some(1)), -5);
    }

    #[test]
    fn total_available_sums_location_rows() {
        let rows = vec![row(10, 3, 1), row(2, 5, 0), row(4, 0, 0)];
        let expected: i32 = rows.iter().map(location_available).sum();
        assert_eq!(expected, 6 - 3 + 4);
        assert_eq!(total_available(&item_with_flat_total(999), &rows), expected);
    }

    #[test]
    fn total_available_falls_back_to_flat_field() {
        assert_eq!(total_available(&item_with_flat_total(42), &[]), 42);
    }

    #[test]
    fn total_available_reads_deprecated_fields_when_flat_fields_absent() {
        let mut item = item_with_flat_total(0);
        item.total_on_hand = None;
        item.total_committed = None;
        item.total_unavailable = None;
        item.total_available = None;
        item.legacy_available = Some(42);
        assert_eq!(total_available(&item, &[]), 42);
    }

    #[test]
    fn stock_status_boundaries() {
        assert_eq!(stock_status(0), StockStatus::OutOfStock);
        assert_eq!(stock_status(1), StockStatus::LowStock);
        assert_eq!(stock_status(4), StockStatus::LowStock);
        assert_eq!(stock_status(5), StockStatus::InStock);
        assert_eq!(stock_status(100), StockStatus::InStock);
    }

    #[test]
    fn stock_status_negative_is_oversell_not_out_of_stock() {
        assert_eq!(stock_status(-3), StockStatus::InStock);
    }
}
