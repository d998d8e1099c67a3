//! Service layer: one struct per aggregate, each owning its table(s) and
//! the domain rules around them. Handlers hold these through
//! [`AppServices`] and never touch the database directly.

pub mod collections;
pub mod inventory;
pub mod locations;
pub mod media;
pub mod orders;
pub mod products;

use crate::{config::AppConfig, db::DbPool, events::EventSender, kv::DbKvStore};
use std::sync::Arc;

/// All services, built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: products::ProductService,
    pub collections: collections::CollectionService,
    pub inventory: inventory::InventoryService,
    pub locations: locations::LocationService,
    pub orders: orders::OrderService,
    pub media: media::MediaService,
    pub legacy: crate::legacy::LegacyStockMigration,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let kv = Arc::new(DbKvStore::new(db.clone()));
        let locations = locations::LocationService::new(db.clone(), event_sender.clone());

        Self {
            products: products::ProductService::new(db.clone(), event_sender.clone()),
            collections: collections::CollectionService::new(db.clone(), event_sender.clone()),
            inventory: inventory::InventoryService::new(db.clone(), event_sender.clone()),
            orders: orders::OrderService::new(
                db.clone(),
                event_sender.clone(),
                kv,
                locations.clone(),
                config.order_number_prefix.clone(),
                config.currency.clone(),
            ),
            locations,
            media: media::MediaService::new(config.media.clone()),
            legacy: crate::legacy::LegacyStockMigration::new(db),
        }
    }
}
