//! Lightweight in-process event plumbing. Events are observational only:
//! they carry no delivery, ordering, or retry guarantees, and every
//! stock/catalog mutation is already durable before its event is sent.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events emitted by the services after successful writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Inventory
    InventoryAdjusted {
        item_id: Uuid,
        location_id: Uuid,
        quantity_before: i32,
        quantity_after: i32,
        kind: String,
        adjustment_id: Uuid,
    },
    InventoryTransferred {
        item_id: Uuid,
        from_location_id: Uuid,
        to_location_id: Uuid,
        quantity: i32,
    },

    // Orders
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Catalog
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    CollectionCreated(Uuid),
    CollectionUpdated(Uuid),
    CollectionDeleted(Uuid),
    ProductsLinkedToCollection {
        collection_id: Uuid,
        product_count: usize,
    },

    // Locations
    LocationCreated(Uuid),
    LocationUpdated(Uuid),
    LocationDeleted(Uuid),
    DefaultLocationChanged {
        old_default: Option<Uuid>,
        new_default: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs on failure instead of returning an error.
    /// Used after a write has already committed, where event loss must not
    /// fail the request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event after committed write: {}", e);
        }
    }
}

/// Event processing loop; logs every event. Spawned once at startup.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InventoryAdjusted {
                item_id,
                location_id,
                quantity_before,
                quantity_after,
                kind,
                ..
            } => {
                info!(
                    %item_id, %location_id, quantity_before, quantity_after, %kind,
                    "inventory adjusted"
                );
            }
            Event::OrderCreated(order_id) => {
                info!(%order_id, "order created");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
            }
            other => {
                info!(event = ?other, "event processed");
            }
        }
    }

    error!("Event channel closed; event processing loop exiting");
}
