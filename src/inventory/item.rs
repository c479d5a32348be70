use crate::types::{Amount, ItemKey};

/// A tag attached to an item description, for example a Team Fortress 2 quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub internal_name: String,
    pub name: String,
    pub category: String,
    pub category_name: Option<String>,
    pub color: Option<String>,
}

/// One tradable unit assembled from an inventory entry and its shared description
/// record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    /// The item's display name.
    pub name: String,
    /// The name of the item on the market, before any rename.
    pub original_name: String,
    /// Whether this item can be traded or not.
    pub tradable: bool,
    /// Whether this item is marketable or not.
    pub marketable: bool,
    /// The description lines joined with newlines.
    pub description: String,
    /// Tags in the order the description record listed them.
    pub tags: Vec<Tag>,
    /// `1` for non-stackable items.
    pub amount: Amount,
}

#[cfg(test)]
pub(crate) fn test_item(assetid: u64, name: &str) -> Item {
    Item {
        key: ItemKey::new(440, 2, assetid),
        name: name.to_owned(),
        original_name: name.to_owned(),
        tradable: true,
        marketable: true,
        description: String::new(),
        tags: Vec::new(),
        amount: 1,
    }
}
