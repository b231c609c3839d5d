//! Work-item type metadata model.

use serde::{Deserialize, Serialize};

/// A work-item type available in the project (Bug, Task, User Story...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemType {
    /// Display name of the type.
    pub name: String,

    /// Reference name, e.g. "Microsoft.VSTS.WorkItemTypes.Bug".
    #[serde(default)]
    pub reference_name: String,

    /// Type description.
    #[serde(default)]
    pub description: String,

    /// Whether the type is disabled for the project.
    #[serde(default)]
    pub is_disabled: bool,

    /// Type REST locator.
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_payload() {
        let json = r#"{
            "name": "Bug",
            "referenceName": "Microsoft.VSTS.WorkItemTypes.Bug",
            "description": "Describes a divergence",
            "isDisabled": false,
            "url": "https://dev.azure.com/org/proj/_apis/wit/workItemTypes/Bug"
        }"#;

        let wit: WorkItemType = serde_json::from_str(json).unwrap();
        assert_eq!(wit.name, "Bug");
        assert_eq!(wit.reference_name, "Microsoft.VSTS.WorkItemTypes.Bug");
        assert!(!wit.is_disabled);
    }
}
