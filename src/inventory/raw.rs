use crate::error::{Error, MissingDescriptionError};
use crate::serialize;
use crate::types::{Amount, AssetId, ClassId, InstanceId, InventoryType, ItemKey};
use super::item::{Item, Tag};
use std::collections::HashMap;
use serde::Deserialize;

/// One page of the `inventory/json` endpoint.
#[derive(Deserialize, Debug)]
pub(crate) struct RawInventoryPage {
    #[serde(default)]
    #[serde(deserialize_with = "serialize::into_bool")]
    pub success: bool,
    #[serde(default)]
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::into_bool")]
    pub more: bool,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_number_or_false")]
    pub more_start: Option<u64>,
    #[serde(default)]
    #[serde(rename = "rgInventory")]
    #[serde(deserialize_with = "serialize::map_or_empty_seq")]
    pub inventory: HashMap<String, RawInventoryEntry>,
    #[serde(default)]
    #[serde(rename = "rgDescriptions")]
    #[serde(deserialize_with = "serialize::map_or_empty_seq")]
    pub descriptions: HashMap<String, RawDescription>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawInventoryEntry {
    #[serde(deserialize_with = "serialize::string_or_number")]
    pub id: AssetId,
    #[serde(deserialize_with = "serialize::string_or_number")]
    pub classid: ClassId,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_string_0_as_none")]
    pub instanceid: InstanceId,
    #[serde(default = "default_amount")]
    #[serde(deserialize_with = "serialize::string_or_number")]
    pub amount: Amount,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::string_or_number")]
    pub pos: u32,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawDescription {
    #[serde(deserialize_with = "serialize::string_or_number")]
    pub classid: ClassId,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_string_0_as_none")]
    pub instanceid: InstanceId,
    pub name: String,
    pub market_name: String,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::into_bool")]
    pub tradable: bool,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::into_bool")]
    pub marketable: bool,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::hashmap_or_vec")]
    pub descriptions: Vec<RawDescriptionLine>,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::hashmap_or_vec")]
    pub tags: Vec<RawTag>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawDescriptionLine {
    #[serde(default)]
    pub value: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawTag {
    pub internal_name: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_amount() -> Amount {
    1
}

fn description_key(classid: ClassId, instanceid: InstanceId) -> String {
    format!("{}_{}", classid, instanceid.unwrap_or(0))
}

impl RawInventoryPage {
    /// Pairs each inventory entry with its shared description record, restoring
    /// display order from the `pos` field.
    ///
    /// An entry without a matching description is fatal for the page.
    pub fn items(&self, inventory_type: InventoryType) -> Result<Vec<Item>, Error> {
        let mut entries = self.inventory.values().collect::<Vec<_>>();

        entries.sort_by_key(|entry| entry.pos);

        entries
            .into_iter()
            .map(|entry| {
                let description = self.descriptions
                    .get(&description_key(entry.classid, entry.instanceid))
                    .ok_or(MissingDescriptionError {
                        classid: entry.classid,
                        instanceid: entry.instanceid,
                    })?;

                Ok(Item {
                    key: ItemKey::new(inventory_type.appid, inventory_type.contextid, entry.id),
                    name: description.name.clone(),
                    original_name: description.market_name.clone(),
                    tradable: description.tradable,
                    marketable: description.marketable,
                    description: description.descriptions
                        .iter()
                        .map(|line| line.value.as_str())
                        .collect::<Vec<_>>()
                        .join("\n"),
                    tags: description.tags
                        .iter()
                        .map(|tag| Tag {
                            internal_name: tag.internal_name.clone(),
                            name: tag.name.clone(),
                            category: tag.category.clone(),
                            category_name: tag.category_name.clone(),
                            color: tag.color.clone(),
                        })
                        .collect(),
                    amount: entry.amount,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inventory_page() {
        let page: RawInventoryPage = serde_json::from_str(include_str!("fixtures/inventory_page.json")).unwrap();

        assert!(page.success);
        assert!(!page.more);
        assert_eq!(page.more_start, None);

        let items = page.items(InventoryType::TEAM_FORTRESS_2).unwrap();

        assert_eq!(items.len(), 2);
        // pos restores display order regardless of map iteration order
        assert_eq!(items[0].original_name, "Scrap Metal");
        assert_eq!(items[0].key, ItemKey::new(440, 2, 11152148507));
        assert_eq!(items[1].name, "Trade Chatterbox");
        assert_eq!(items[1].tags[0].category, "Quality");
        assert_eq!(items[1].description, "A noisemaker.\nLimited quantity.");
    }

    #[test]
    fn parses_numeric_cursor() {
        let page: RawInventoryPage = serde_json::from_str(
            r#"{"success": true, "more": true, "more_start": 2000, "rgInventory": [], "rgDescriptions": []}"#,
        ).unwrap();

        assert!(page.more);
        assert_eq!(page.more_start, Some(2000));
    }

    #[test]
    fn missing_description_is_fatal() {
        let page: RawInventoryPage = serde_json::from_str(
            r#"{
                "success": true,
                "more": false,
                "more_start": false,
                "rgInventory": {
                    "1": {"id": "1", "classid": "42", "instanceid": "0", "amount": "1", "pos": 1}
                },
                "rgDescriptions": []
            }"#,
        ).unwrap();
        let error = page.items(InventoryType::TEAM_FORTRESS_2).unwrap_err();

        assert!(matches!(error, Error::MissingDescription(_)));
    }
}
