//! Project model.

use serde::{Deserialize, Serialize};

/// An Azure DevOps project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id (a GUID).
    pub id: String,

    /// Project name.
    pub name: String,

    /// Project REST locator.
    pub url: String,

    /// Project lifecycle state (e.g. "wellFormed").
    #[serde(default)]
    pub state: String,

    /// Project description, empty when the project has none.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_payload() {
        let json = r#"{
            "id": "proj-1",
            "name": "Fabrikam",
            "description": "Team project",
            "url": "https://dev.azure.com/org/_apis/projects/proj-1",
            "state": "wellFormed"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, "proj-1");
        assert_eq!(project.name, "Fabrikam");
        assert_eq!(project.state, "wellFormed");
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let json = r#"{
            "id": "proj-1",
            "name": "Fabrikam",
            "url": "https://dev.azure.com/org/_apis/projects/proj-1",
            "state": "wellFormed"
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.description, "");
    }
}
