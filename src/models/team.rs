//! Team model.

use serde::{Deserialize, Serialize};

/// A team within an Azure DevOps project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Team id (a GUID).
    pub id: String,

    /// Team name.
    pub name: String,

    /// Team REST locator.
    pub url: String,

    /// Team description.
    #[serde(default)]
    pub description: String,

    /// Opaque identity blob attached by the service.
    #[serde(default)]
    pub identity: serde_json::Map<String, serde_json::Value>,

    /// Identity REST locator.
    #[serde(default)]
    pub identity_url: String,

    /// Id of the owning project.
    #[serde(default)]
    pub project_id: String,

    /// Name of the owning project.
    #[serde(default)]
    pub project_name: String,
}
