//! Attachment reference model.

use serde::{Deserialize, Serialize};

/// Server-assigned identity of an uploaded attachment.
///
/// Returned by the attachment upload endpoint and later referenced when
/// attaching the file to a work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentReference {
    /// Attachment id (a GUID).
    pub id: String,

    /// Download locator for the uploaded bytes.
    pub url: String,
}
