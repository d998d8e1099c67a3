//! OpenAPI document assembled from the handler annotations, served with
//! Swagger UI at `/docs`.

use utoipa::OpenApi;

use crate::{entities, handlers, legacy, order_math, services, stock};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::bulk_delete_products,
        handlers::products::create_item,
        handlers::products::list_items,
        handlers::products::get_item,
        handlers::products::update_item,
        handlers::products::delete_item,
        handlers::products::item_stock,
        handlers::products::create_option_set,
        handlers::products::list_option_sets,
        handlers::products::list_option_set_values,
        handlers::products::delete_option_set,
        handlers::products::list_product_option_sets,
        handlers::products::attach_option_set,
        handlers::products::detach_option_set,
        handlers::collections::create_collection,
        handlers::collections::list_collections,
        handlers::collections::get_collection,
        handlers::collections::update_collection,
        handlers::collections::delete_collection,
        handlers::collections::list_collection_products,
        handlers::collections::bulk_assign_products,
        handlers::collections::link_product,
        handlers::collections::unlink_product,
        handlers::inventory::adjust_stock,
        handlers::inventory::list_adjustments,
        handlers::inventory::transfer_stock,
        handlers::inventory::get_level,
        handlers::inventory::set_level,
        handlers::locations::create_location,
        handlers::locations::list_locations,
        handlers::locations::get_default_location,
        handlers::locations::get_location,
        handlers::locations::update_location,
        handlers::locations::set_default_location,
        handlers::locations::delete_location,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::media::upload_url,
        handlers::media::download_url,
        handlers::legacy::run_migration,
        handlers::legacy::run_cleanup,
        handlers::legacy::run_verify,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        entities::product::Model,
        entities::collection::Model,
        entities::item::Model,
        entities::item_location::Model,
        entities::location::Model,
        entities::location::LocationKind,
        entities::inventory_adjustment::Model,
        entities::inventory_adjustment::AdjustmentKind,
        entities::order::Model,
        entities::order::OrderStatus,
        entities::order_item::Model,
        entities::option_set::Model,
        entities::option_value::Model,
        stock::StockStatus,
        order_math::DiscountKind,
        order_math::DiscountSettings,
        order_math::ShippingSettings,
        order_math::TaxMode,
        order_math::TaxSettings,
        order_math::OrderTotals,
        services::inventory::AdjustStockInput,
        services::inventory::TransferStockInput,
        services::inventory::ItemStockView,
        services::orders::CreateOrderInput,
        services::orders::OrderLineInput,
        services::orders::OrderWithLines,
        services::products::CreateProductInput,
        services::products::UpdateProductInput,
        services::products::CreateItemInput,
        services::products::UpdateItemInput,
        services::products::CreateOptionSetInput,
        services::collections::CreateCollectionInput,
        services::collections::UpdateCollectionInput,
        services::locations::CreateLocationInput,
        services::locations::UpdateLocationInput,
        services::media::SignedUrl,
        legacy::MigrationReport,
        legacy::CleanupReport,
        legacy::VerifyReport,
        legacy::FlaggedItem,
        legacy::MigrationState,
        legacy::CanonicalStock,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "products", description = "Product catalog"),
        (name = "items", description = "Sellable items (SKUs)"),
        (name = "option-sets", description = "Product option sets"),
        (name = "collections", description = "Merchandising collections"),
        (name = "inventory", description = "Stock counters and audit trail"),
        (name = "locations", description = "Inventory locations"),
        (name = "orders", description = "Sales orders"),
        (name = "media", description = "Signed media URLs"),
        (name = "admin", description = "Operator jobs"),
    ),
    info(
        title = "pos-api",
        description = "Point-of-sale backend: catalog, multi-location inventory and orders"
    )
)]
pub struct ApiDoc;
