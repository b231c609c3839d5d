//! Backlog level models.

use serde::{Deserialize, Serialize};

use crate::models::query::WorkItemLink;

/// A team backlog level (e.g. Epics, Features, Backlog items).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backlog {
    /// Backlog level id, e.g. "Microsoft.RequirementCategory".
    pub id: String,

    /// Display name of the level.
    pub name: String,

    /// Ordering rank among the team's levels.
    #[serde(default)]
    pub rank: i64,

    /// Level type reported by the service, e.g. "backlog" or "portfolio".
    #[serde(rename = "type", default)]
    pub level_type: String,

    /// Work-item type names that live on this level.
    #[serde(default)]
    pub work_item_types: Vec<BacklogWorkItemType>,
}

/// A work-item type name entry inside a backlog level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogWorkItemType {
    /// Type name, e.g. "User Story".
    pub name: String,

    /// Type REST locator.
    #[serde(default)]
    pub url: String,
}

/// Response shape of the backlog work-item listing: one entry per item,
/// each wrapping a target reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BacklogWorkItemsResponse {
    #[serde(default)]
    pub work_items: Vec<BacklogWorkItemEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BacklogWorkItemEntry {
    pub target: WorkItemLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backlog_level() {
        let json = r#"{
            "id": "Microsoft.RequirementCategory",
            "name": "Backlog items",
            "rank": 2,
            "type": "backlog",
            "workItemTypes": [
                {"name": "Product Backlog Item", "url": "https://dev.azure.com/t/pbi"},
                {"name": "Bug", "url": "https://dev.azure.com/t/bug"}
            ]
        }"#;

        let backlog: Backlog = serde_json::from_str(json).unwrap();
        assert_eq!(backlog.id, "Microsoft.RequirementCategory");
        assert_eq!(backlog.rank, 2);
        assert_eq!(backlog.level_type, "backlog");
        assert_eq!(backlog.work_item_types.len(), 2);
    }

    #[test]
    fn deserializes_work_item_listing() {
        let json = r#"{
            "workItems": [
                {"target": {"id": 297, "url": "https://dev.azure.com/wi/297"}},
                {"target": {"id": 299, "url": "https://dev.azure.com/wi/299"}}
            ]
        }"#;

        let listing: BacklogWorkItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.work_items.len(), 2);
        assert_eq!(listing.work_items[0].target.id, 297);
    }
}
