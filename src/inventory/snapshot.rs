use crate::error::Error;
use crate::types::{InventoryType, ItemKey};
use super::item::Item;
use std::collections::HashSet;
use steamid_ng::SteamID;

/// An immutable, fully merged view of one inventory-type fetch.
///
/// Built incrementally by the synchronizer, then frozen. An empty inventory that
/// parsed successfully is still loaded; only a fetch failure leaves it unloaded.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    owner: SteamID,
    inventory_type: InventoryType,
    items: Vec<Item>,
    keys: HashSet<ItemKey>,
    loaded: bool,
    errors: Vec<String>,
}

impl InventorySnapshot {
    pub(crate) fn new(owner: SteamID, inventory_type: InventoryType) -> Self {
        Self {
            owner,
            inventory_type,
            items: Vec::new(),
            keys: HashSet::new(),
            loaded: false,
            errors: Vec::new(),
        }
    }

    pub fn owner(&self) -> SteamID {
        self.owner
    }

    pub fn inventory_type(&self) -> InventoryType {
        self.inventory_type
    }

    /// Items in the order they were merged.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        if !self.keys.contains(key) {
            return None;
        }

        self.items.iter().find(|item| item.key == *key)
    }

    /// Whether the fetch ran to completion.
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Errors encountered while fetching. Non-empty implies `loaded` is false.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn merge(&mut self, items: Vec<Item>) {
        for item in items {
            // The server may resend a page it already served; first occurrence wins.
            if self.keys.insert(item.key) {
                self.items.push(item);
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        self.loaded = true;
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.loaded = false;
        self.errors.push(error);
    }

    #[cfg(test)]
    pub(crate) fn test_loaded(
        owner: SteamID,
        inventory_type: InventoryType,
        items: Vec<Item>,
    ) -> Self {
        let mut snapshot = Self::new(owner, inventory_type);

        snapshot.merge(items);
        snapshot.finish();
        snapshot
    }
}

/// Snapshots for several inventory types of one owner, fetched concurrently.
#[derive(Debug, Clone)]
pub struct InventoryCollection {
    snapshots: Vec<InventorySnapshot>,
}

impl InventoryCollection {
    pub(crate) fn new(snapshots: Vec<InventorySnapshot>) -> Self {
        Self { snapshots }
    }

    pub fn snapshots(&self) -> &[InventorySnapshot] {
        &self.snapshots
    }

    /// Looks an item up across every loaded snapshot.
    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.loaded())
            .find_map(|snapshot| snapshot.get(key))
    }

    /// Errors when any inventory type failed to load. Sibling successes remain
    /// usable either way.
    pub fn ensure_loaded(&self) -> Result<(), Error> {
        let errors = self.snapshots
            .iter()
            .filter(|snapshot| !snapshot.loaded())
            .flat_map(|snapshot| snapshot.errors().iter().cloned())
            .collect::<Vec<_>>();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialLoad(errors))
        }
    }
}
