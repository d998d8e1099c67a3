use pos_api::{
    config::{AppConfig, MediaConfig},
    db::{run_migrations, DbPool},
    entities::location::LocationKind,
    events::{Event, EventSender},
    services::{locations::CreateLocationInput, products::{CreateItemInput, CreateProductInput}, AppServices},
};
use rust_decimal::Decimal;
use sea_orm::Database;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    // Held so event sends keep succeeding.
    pub events: mpsc::Receiver<Event>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: false,
        order_number_prefix: "#".to_string(),
        currency: "USD".to_string(),
        cors_allowed_origins: None,
        request_timeout_secs: 30,
        media: MediaConfig::default(),
    }
}

/// Fresh in-memory database with migrations applied and all services
/// wired against it.
pub async fn setup() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&db).await.expect("migrations");

    let db = Arc::new(db);
    let (tx, rx) = mpsc::channel(256);
    let event_sender = Arc::new(EventSender::new(tx));
    let services = AppServices::new(db.clone(), event_sender, &test_config());

    TestApp {
        db,
        services,
        events: rx,
    }
}

pub async fn create_location(app: &TestApp, name: &str, is_default: bool) -> Uuid {
    app.services
        .locations
        .create(CreateLocationInput {
            name: name.to_string(),
            kind: LocationKind::Warehouse,
            is_default,
        })
        .await
        .expect("create location")
        .id
}

pub async fn create_item(app: &TestApp, sku: &str, price: Decimal) -> Uuid {
    let product = app
        .services
        .products
        .create(CreateProductInput {
            name: format!("Product {}", sku),
            description: None,
            image_url: None,
        })
        .await
        .expect("create product");

    app.services
        .products
        .create_item(CreateItemInput {
            product_id: product.id,
            sku: sku.to_string(),
            name: format!("Item {}", sku),
            price,
            barcode: None,
        })
        .await
        .expect("create item")
        .id
}
