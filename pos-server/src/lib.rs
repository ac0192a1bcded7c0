//! Restaurant order lifecycle and billing engine
//!
//! The engine is the single source of truth for order state. Clients
//! (UI layers, transport adapters) submit [`shared::order::OrderCommand`]s
//! and must replace any local mirror wholesale with the snapshot returned by
//! a query - never merge field-by-field.

pub mod logging;
pub mod notify;
pub mod orders;
pub mod services;

// Re-exports
pub use notify::NotificationSink;
pub use orders::manager::{ManagerConfig, OrdersManager};
pub use orders::tickets::TicketBaselineStore;
pub use services::menu::{MenuCatalog, MenuItemMeta};
