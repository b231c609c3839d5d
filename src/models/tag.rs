//! Work-item tag model.

use serde::{Deserialize, Serialize};

/// A work-item tag definition.
///
/// Full tag entities only come back from the tag listing endpoint; when
/// tagging a work item the plain tag *name* is what goes on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id (a GUID).
    pub id: String,

    /// Tag name.
    pub name: String,

    /// Tag REST locator.
    pub url: String,
}
