//! Menu catalog collaborator
//!
//! The engine resolves item name/price from the catalog exactly once, when a
//! line is first added to an order. Later catalog changes never touch lines
//! already on an order.

use dashmap::DashMap;

/// Metadata the engine needs from the menu for one item
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemMeta {
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
}

/// Menu lookup collaborator.
///
/// Implementations must resolve an item id to its current name and price.
/// Inactive items resolve to `None`.
pub trait MenuCatalog: Send + Sync {
    fn resolve(&self, item_id: &str) -> Option<MenuItemMeta>;
}

/// In-memory menu catalog.
///
/// Backs tests and single-process deployments; production deployments wrap
/// their own catalog source behind [`MenuCatalog`].
#[derive(Debug, Default)]
pub struct InMemoryMenuCatalog {
    items: DashMap<String, MenuItemMeta>,
}

impl InMemoryMenuCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a menu item
    pub fn upsert(&self, item: MenuItemMeta) {
        self.items.insert(item.item_id.clone(), item);
    }

    /// Convenience for seeding: insert an active item
    pub fn add_item(&self, item_id: &str, name: &str, price: f64) {
        self.upsert(MenuItemMeta {
            item_id: item_id.to_string(),
            name: name.to_string(),
            price,
            is_active: true,
        });
    }

    /// Change an item's price (already-added order lines keep their snapshot)
    pub fn set_price(&self, item_id: &str, price: f64) {
        if let Some(mut item) = self.items.get_mut(item_id) {
            item.price = price;
        }
    }

    /// Deactivate an item so it no longer resolves
    pub fn deactivate(&self, item_id: &str) {
        if let Some(mut item) = self.items.get_mut(item_id) {
            item.is_active = false;
        }
    }
}

impl MenuCatalog for InMemoryMenuCatalog {
    fn resolve(&self, item_id: &str) -> Option<MenuItemMeta> {
        self.items
            .get(item_id)
            .filter(|item| item.is_active)
            .map(|item| item.clone())
    }
}
