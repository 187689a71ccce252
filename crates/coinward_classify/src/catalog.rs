//! # Asset Catalog
//!
//! Read-only view into game asset metadata, implemented by the host.
//! Lookups return `None` when the asset is unknown or the catalog is
//! unavailable; resolvers treat that as "fall through to the next rule",
//! never as an error.

/// Host-provided asset metadata lookups.
pub trait AssetCatalog: Send + Sync {
    /// Categories declared on an item (`Weapon`, `Tool`, `Food`, ...), if
    /// the item is known.
    fn item_categories(&self, item_id: &str) -> Option<Vec<String>>;

    /// Family tags declared on a block (`Iron`, `Mithril`, ...), if the
    /// block is known.
    fn block_families(&self, block_id: &str) -> Option<Vec<String>>;
}

/// Catalog that knows nothing; every lookup falls through.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl AssetCatalog for EmptyCatalog {
    fn item_categories(&self, _item_id: &str) -> Option<Vec<String>> {
        None
    }

    fn block_families(&self, _block_id: &str) -> Option<Vec<String>> {
        None
    }
}
