pub mod app_setting;
pub mod collection;
pub mod collection_product;
pub mod inventory_adjustment;
pub mod item;
pub mod item_location;
pub mod location;
pub mod option_set;
pub mod option_value;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_option_set;
