//! Engine collaborator services

pub mod menu;

pub use menu::{InMemoryMenuCatalog, MenuCatalog, MenuItemMeta};
