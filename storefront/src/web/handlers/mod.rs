// storefront/src/web/handlers/mod.rs

pub mod admin_order_handlers;
pub mod order_handlers;
