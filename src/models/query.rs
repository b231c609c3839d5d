//! Work-item query models.

use serde::{Deserialize, Serialize};

/// A saved work-item query or query folder.
///
/// The queries endpoint returns a tree: folders carry `isFolder` and,
/// when fetched with `$depth` > 0, their immediate `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Query id (a GUID).
    pub id: String,

    /// Query or folder name.
    pub name: String,

    /// Hierarchical path, e.g. "Shared Queries/Triage".
    #[serde(default)]
    pub path: String,

    /// Whether this node is a folder rather than a runnable query.
    #[serde(default)]
    pub is_folder: bool,

    /// Whether this folder has children (may be set even when the
    /// requested depth did not include them).
    #[serde(default)]
    pub has_children: bool,

    /// Whether the query is shared with the whole project.
    #[serde(default)]
    pub is_public: bool,

    /// Immediate children, present only for folders fetched with depth.
    #[serde(default)]
    pub children: Vec<Query>,

    /// Query REST locator.
    #[serde(default)]
    pub url: String,
}

/// A work-item reference inside a query result or backlog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemLink {
    /// Work-item id.
    pub id: u64,

    /// Work-item REST locator.
    pub url: String,
}
