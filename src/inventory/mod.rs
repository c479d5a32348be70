//! Paginated inventory synchronization.

mod item;
mod raw;
mod snapshot;
mod synchronizer;

pub use item::{Item, Tag};
#[cfg(test)]
pub(crate) use item::test_item;
pub use snapshot::{InventoryCollection, InventorySnapshot};
pub use synchronizer::{InventoryPage, InventorySynchronizer};
