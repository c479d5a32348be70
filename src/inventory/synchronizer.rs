use crate::error::Error;
use crate::types::InventoryType;
use crate::web::WebClient;
use super::item::Item;
use super::raw::RawInventoryPage;
use super::snapshot::{InventoryCollection, InventorySnapshot};
use futures::future::join_all;
use reqwest::Method;
use steamid_ng::SteamID;

const HOSTNAME: &str = "https://steamcommunity.com";

/// One fetched page, already paired with its descriptions.
#[derive(Debug)]
pub struct InventoryPage {
    pub items: Vec<Item>,
    pub more: bool,
    pub more_start: Option<u64>,
}

/// Fetches and merges paginated inventory listings into immutable snapshots.
#[derive(Debug, Clone)]
pub struct InventorySynchronizer<W> {
    web: W,
}

impl<W: WebClient> InventorySynchronizer<W> {
    pub fn new(web: W) -> Self {
        Self { web }
    }

    /// Fetches a single inventory page at the given cursor.
    pub async fn fetch_page(
        &self,
        owner: SteamID,
        inventory_type: InventoryType,
        cursor: Option<u64>,
    ) -> Result<InventoryPage, Error> {
        let sid = u64::from(owner);
        let url = format!(
            "{HOSTNAME}/profiles/{sid}/inventory/json/{}/{}/",
            inventory_type.appid,
            inventory_type.contextid,
        );
        let mut query: Vec<(&str, String)> = Vec::new();

        if let Some(start) = cursor {
            query.push(("start", start.to_string()));
        }

        let body = self.web.fetch(&url, Method::GET, &query).await?;
        let page: RawInventoryPage = serde_json::from_slice(&body)?;

        if !page.success {
            let message = page.error
                .clone()
                .unwrap_or_else(|| "Bad response".into());

            return Err(Error::ServerRejected(message));
        }

        let items = page.items(inventory_type)?;

        Ok(InventoryPage {
            items,
            more: page.more,
            more_start: page.more_start,
        })
    }

    /// Walks every page for one (owner, inventory type) pair into a snapshot.
    ///
    /// Pages are fetched strictly in cursor order since each cursor is assigned by
    /// the server relative to the previous page. A failed page aborts this fetch
    /// only: the snapshot comes back unloaded with an explanatory error rather than
    /// propagating past the synchronizer boundary.
    pub async fn fetch_all(
        &self,
        owner: SteamID,
        inventory_type: InventoryType,
    ) -> InventorySnapshot {
        let mut snapshot = InventorySnapshot::new(owner, inventory_type);
        let mut cursor: Option<u64> = None;

        loop {
            match self.fetch_page(owner, inventory_type, cursor).await {
                Ok(page) => {
                    snapshot.merge(page.items);

                    if !page.more {
                        break;
                    }

                    // shouldn't occur, but we wouldn't want to walk this endlessly if it does...
                    if page.more_start.is_none() || page.more_start == cursor {
                        snapshot.fail(format!(
                            "Malformed pagination cursor for inventory {inventory_type}"
                        ));
                        return snapshot;
                    }

                    cursor = page.more_start;
                },
                Err(error) => {
                    log::debug!("Inventory fetch for {inventory_type} failed: {error}");
                    snapshot.fail(error.to_string());
                    return snapshot;
                },
            }
        }

        snapshot.finish();
        snapshot
    }

    /// Fetches several inventory types of one owner concurrently.
    ///
    /// The join is an awaited barrier across all per-type fetches; pages within a
    /// type stay strictly ordered. A failed type does not abort its siblings.
    pub async fn fetch_inventories(
        &self,
        owner: SteamID,
        inventory_types: &[InventoryType],
    ) -> InventoryCollection {
        let fetches = inventory_types
            .iter()
            .map(|inventory_type| self.fetch_all(owner, *inventory_type))
            .collect::<Vec<_>>();
        let snapshots = join_all(fetches).await;

        InventoryCollection::new(snapshots)
    }
}
