//! Types for common values in Steam responses.

use std::fmt;

/// Uniquely identifies an application on Steam. For example: 440 for Team Fortress 2.
pub type AppId = u32;
/// A context ID belonging to an [`AppId`].
pub type ContextId = u64;
/// An asset ID unique to an [`AppId`] + [`ContextId`] combination.
pub type AssetId = u64;
/// An amount for stackable items. For non-stackable items this is simply `1`.
pub type Amount = u32;
/// An ID for a shared item description which provides a general overview of an item.
pub type ClassId = u64;
/// A more specific instance of a description, for example a Team Fortress 2 item which is
/// painted.
pub type InstanceId = Option<u64>;

pub use crate::time::ServerTime;

/// Uniquely identifies one tradable unit across all games and inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub appid: AppId,
    pub contextid: ContextId,
    pub assetid: AssetId,
}

impl ItemKey {
    pub const fn new(appid: AppId, contextid: ContextId, assetid: AssetId) -> Self {
        Self {
            appid,
            contextid,
            assetid,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.appid, self.contextid, self.assetid)
    }
}

/// One inventory of one game. A single game may have multiple inventories under different
/// context IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryType {
    pub appid: AppId,
    pub contextid: ContextId,
}

impl InventoryType {
    /// Team Fortress 2 items.
    pub const TEAM_FORTRESS_2: Self = Self::new(440, 2);
    /// Cards, backgrounds, and emotes.
    pub const STEAM_COMMUNITY: Self = Self::new(753, 6);

    pub const fn new(appid: AppId, contextid: ContextId) -> Self {
        Self { appid, contextid }
    }
}

impl fmt::Display for InventoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.appid, self.contextid)
    }
}
