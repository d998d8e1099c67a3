//! Backfill job for items that still carry the deprecated flat stock
//! fields (`legacy_onhand`, `legacy_committed`, `legacy_available`)
//! instead of the newer `total_*` aggregates.
//!
//! The job is a plain batch loop: one write per record that needs one,
//! no checkpointing. A failure partway through leaves a mixed state that
//! is resolved by re-running, which is safe because the patch computation
//! is idempotent (an already-migrated record yields an empty patch).

use crate::{
    db::DbPool,
    entities::item::{self, Entity as Item},
    errors::ServiceError,
    stock,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stock numbers for an item with the legacy-vs-new field duplication
/// resolved. Consumers read this instead of re-checking which field name
/// is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct CanonicalStock {
    pub on_hand: i32,
    pub committed: i32,
    pub unavailable: i32,
    pub available: i32,
}

/// Resolves the flat stock numbers for an item: the newer `total_*`
/// fields win where present, the deprecated `legacy_*` fields fill the
/// gaps, and anything still missing coalesces to zero.
pub fn normalize(model: &item::Model) -> CanonicalStock {
    let on_hand = model.total_on_hand.or(model.legacy_onhand);
    let committed = model.total_committed.or(model.legacy_committed);
    let unavailable = model.total_unavailable;
    let available = model
        .total_available
        .or(model.legacy_available)
        .unwrap_or_else(|| stock::available_or_zero(on_hand, committed, unavailable));

    CanonicalStock {
        on_hand: on_hand.unwrap_or(0),
        committed: committed.unwrap_or(0),
        unavailable: unavailable.unwrap_or(0),
        available,
    }
}

/// Field copies needed to migrate one record. Empty when the record
/// already has every new field its legacy fields could supply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub set_total_on_hand: Option<i32>,
    pub set_total_committed: Option<i32>,
    pub set_total_available: Option<i32>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.set_total_on_hand.is_none()
            && self.set_total_committed.is_none()
            && self.set_total_available.is_none()
    }
}

/// Computes the copies a record needs: each legacy value moves to its new
/// field only where the new field is absent. `total_unavailable` has no
/// legacy counterpart and is never touched here.
pub fn compute_patch(model: &item::Model) -> ItemPatch {
    ItemPatch {
        set_total_on_hand: match (model.total_on_hand, model.legacy_onhand) {
            (None, Some(v)) => Some(v),
            _ => None,
        },
        set_total_committed: match (model.total_committed, model.legacy_committed) {
            (None, Some(v)) => Some(v),
            _ => None,
        },
        set_total_available: match (model.total_available, model.legacy_available) {
            (None, Some(v)) => Some(v),
            _ => None,
        },
    }
}

/// Per-record classification produced by the verification pass, based
/// purely on field presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    /// All new fields present, no legacy fields remaining.
    FullyMigrated,
    /// All new fields present but at least one legacy field still set;
    /// resolved by the cleanup pass.
    HasLegacyData,
    /// Some but not all new fields present.
    PartiallyMigrated,
    /// No new fields present.
    NotMigrated,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct MigrationReport {
    pub scanned: usize,
    pub patched: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct CleanupReport {
    pub scanned: usize,
    pub cleaned: usize,
}

/// One item needing operator follow-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct FlaggedItem {
    pub item_id: Uuid,
    pub state: MigrationState,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct VerifyReport {
    pub scanned: usize,
    pub fully_migrated: usize,
    pub has_legacy_data: usize,
    pub partially_migrated: usize,
    pub not_migrated: usize,
    /// Items that are not cleanly migrated, for operator follow-up.
    pub flagged: Vec<FlaggedItem>,
}

/// Operator-invoked batch job over `items`.
#[derive(Clone)]
pub struct LegacyStockMigration {
    db: Arc<DbPool>,
}

impl LegacyStockMigration {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Copies legacy values into the new fields for every record missing
    /// them. One write per record needing a change; re-runnable.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<MigrationReport, ServiceError> {
        let items = Item::find()
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut report = MigrationReport {
            scanned: items.len(),
            ..Default::default()
        };

        for model in items {
            let patch = compute_patch(&model);
            if patch.is_empty() {
                report.skipped += 1;
                continue;
            }

            let id = model.id;
            let mut active: item::ActiveModel = model.into();
            if let Some(v) = patch.set_total_on_hand {
                active.total_on_hand = Set(Some(v));
            }
            if let Some(v) = patch.set_total_committed {
                active.total_committed = Set(Some(v));
            }
            if let Some(v) = patch.set_total_available {
                active.total_available = Set(Some(v));
            }
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| {
                    ServiceError::MigrationError(format!(
                        "Failed to backfill item {}: {}",
                        id, e
                    ))
                })?;
            report.patched += 1;
        }

        info!(
            scanned = report.scanned,
            patched = report.patched,
            skipped = report.skipped,
            "legacy stock backfill finished"
        );
        Ok(report)
    }

    /// Nulls the deprecated fields on records whose new fields are all
    /// present. Run after [`run`](Self::run) has been verified.
    #[instrument(skip(self))]
    pub async fn cleanup(&self) -> Result<CleanupReport, ServiceError> {
        let items = Item::find()
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut report = CleanupReport {
            scanned: items.len(),
            ..Default::default()
        };

        for model in items {
            let has_legacy = model.legacy_onhand.is_some()
                || model.legacy_committed.is_some()
                || model.legacy_available.is_some();
            if !has_legacy {
                continue;
            }

            if classify(&model) != MigrationState::HasLegacyData {
                warn!(item_id = %model.id, "skipping cleanup of un-migrated item");
                continue;
            }

            let id = model.id;
            let mut active: item::ActiveModel = model.into();
            active.legacy_onhand = Set(None);
            active.legacy_committed = Set(None);
            active.legacy_available = Set(None);
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| {
                    ServiceError::MigrationError(format!(
                        "Failed to clean legacy fields on item {}: {}",
                        id, e
                    ))
                })?;
            report.cleaned += 1;
        }

        info!(
            scanned = report.scanned,
            cleaned = report.cleaned,
            "legacy field cleanup finished"
        );
        Ok(report)
    }

    /// Re-reads every record and classifies it by field presence. A
    /// heuristic snapshot, not a transactional guarantee; concurrent
    /// edits during the scan can skew the counts.
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<VerifyReport, ServiceError> {
        let items = Item::find()
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut report = VerifyReport {
            scanned: items.len(),
            ..Default::default()
        };

        for model in &items {
            let state = classify(model);
            match state {
                MigrationState::FullyMigrated => report.fully_migrated += 1,
                MigrationState::HasLegacyData => report.has_legacy_data += 1,
                MigrationState::PartiallyMigrated => report.partially_migrated += 1,
                MigrationState::NotMigrated => report.not_migrated += 1,
            }
            if state != MigrationState::FullyMigrated {
                report.flagged.push(FlaggedItem {
                    item_id: model.id,
                    state,
                });
            }
        }

        Ok(report)
    }
}

/// Classifies one record by presence of its new and legacy fields.
/// `total_unavailable` is excluded: it has no legacy counterpart, so its
/// absence says nothing about migration progress.
pub fn classify(model: &item::Model) -> MigrationState {
    let new_fields = [
        model.total_on_hand,
        model.total_committed,
        model.total_available,
    ];
    let present = new_fields.iter().filter(|f| f.is_some()).count();

    let has_legacy = model.legacy_onhand.is_some()
        || model.legacy_committed.is_some()
        || model.legacy_available.is_some();

    if present == new_fields.len() {
        if has_legacy {
            MigrationState::HasLegacyData
        } else {
            MigrationState::FullyMigrated
        }
    } else if present == 0 {
        MigrationState::NotMigrated
    } else {
        MigrationState::PartiallyMigrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn bare_item() -> item::Model {
        item::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU-1".into(),
            name: "Test item".into(),
            price: Decimal::ZERO,
            barcode: None,
            total_on_hand: None,
            total_committed: None,
            total_unavailable: None,
            total_available: None,
            legacy_onhand: None,
            legacy_committed: None,
            legacy_available: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn patch_copies_only_into_absent_fields() {
        let mut model = bare_item();
        model.legacy_onhand = Some(12);
        model.legacy_committed = Some(3);
        model.legacy_available = Some(9);
        model.total_committed = Some(4);

        let patch = compute_patch(&model);
        assert_eq!(patch.set_total_on_hand, Some(12));
        assert_eq!(patch.set_total_committed, None);
        assert_eq!(patch.set_total_available, Some(9));
    }

    #[test]
    fn patch_on_migrated_record_is_empty_and_idempotent() {
        let mut model = bare_item();
        model.total_on_hand = Some(12);
        model.total_committed = Some(3);
        model.total_available = Some(9);

        assert!(compute_patch(&model).is_empty());
        assert!(compute_patch(&model).is_empty());
    }

    #[test]
    fn patch_without_legacy_data_is_empty() {
        assert!(compute_patch(&bare_item()).is_empty());
    }

    #[test]
    fn normalize_prefers_new_fields() {
        let mut model = bare_item();
        model.total_on_hand = Some(10);
        model.legacy_onhand = Some(99);
        model.total_committed = Some(3);
        model.total_unavailable = Some(1);
        model.total_available = Some(6);

        let stock = normalize(&model);
        assert_eq!(stock.on_hand, 10);
        assert_eq!(stock.available, 6);
    }

    #[test]
    fn normalize_falls_back_to_legacy_then_zero() {
        let mut model = bare_item();
        model.legacy_onhand = Some(7);
        model.legacy_committed = Some(2);

        let stock = normalize(&model);
        assert_eq!(stock.on_hand, 7);
        assert_eq!(stock.committed, 2);
        assert_eq!(stock.unavailable, 0);
        // No stored available anywhere, so it derives.
        assert_eq!(stock.available, 5);
    }

    #[test]
    fn classify_covers_all_states() {
        let mut fully = bare_item();
        fully.total_on_hand = Some(1);
        fully.total_committed = Some(0);
        fully.total_available = Some(1);
        assert_eq!(classify(&fully), MigrationState::FullyMigrated);

        let mut dirty = fully.clone();
        dirty.legacy_onhand = Some(1);
        assert_eq!(classify(&dirty), MigrationState::HasLegacyData);

        let mut partial = bare_item();
        partial.total_on_hand = Some(1);
        assert_eq!(classify(&partial), MigrationState::PartiallyMigrated);

        assert_eq!(classify(&bare_item()), MigrationState::NotMigrated);
    }
}
