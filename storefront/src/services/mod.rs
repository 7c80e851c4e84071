// storefront/src/services/mod.rs

pub mod email_mock;
pub mod order_lifecycle;
pub mod order_queries;
