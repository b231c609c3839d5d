//! JSON-Patch request bodies for work-item mutations.
//!
//! Azure DevOps creates and updates work items with an ordered array of
//! `{op, path, from, value}` operations sent as
//! `application/json-patch+json`.

use serde::Serialize;
use serde_json::{json, Value};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_JSON_PATCH: &str = "application/json-patch+json";

// Field paths, verbatim from the service schema.
pub const FIELD_TITLE: &str = "/fields/System.Title";
pub const FIELD_DESCRIPTION: &str = "/fields/System.Description";
pub const FIELD_TAGS: &str = "/fields/System.Tags";
pub const FIELD_AREA_PATH: &str = "/fields/System.AreaPath";
pub const FIELD_ITERATION_PATH: &str = "/fields/System.IterationPath";
pub const FIELD_REPRO_STEPS: &str = "/fields/Microsoft.VSTS.TCM.ReproSteps";
pub const FIELD_SYSTEM_INFO: &str = "/fields/Microsoft.VSTS.TCM.SystemInfo";
pub const FIELD_ACCEPTANCE_CRITERIA: &str = "/fields/Microsoft.VSTS.Common.AcceptanceCriteria";
pub const FIELD_RESOLUTION: &str = "/fields/Microsoft.VSTS.Common.Resolution";
pub const RELATION_APPEND: &str = "/relations/-";

/// One JSON-Patch operation.
///
/// Field assignments carry an explicit `"from": null` member; relation
/// appends omit it. Both shapes are what the service editor itself emits.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOp {
    pub op: &'static str,
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<()>,
    pub value: Value,
}

impl PatchOp {
    /// An `add` operation assigning a work-item field.
    pub fn add_field(path: &'static str, value: impl Into<Value>) -> Self {
        Self {
            op: "add",
            path,
            from: Some(()),
            value: value.into(),
        }
    }

    /// An `add` operation appending an `AttachedFile` relation.
    pub fn attach_file(url: &str) -> Self {
        Self {
            op: "add",
            path: RELATION_APPEND,
            from: None,
            value: json!({
                "rel": "AttachedFile",
                "url": url,
            }),
        }
    }

    /// An `AttachedFile` relation carrying an attribute comment.
    pub fn attach_file_with_comment(url: &str, comment: &str) -> Self {
        Self {
            op: "add",
            path: RELATION_APPEND,
            from: None,
            value: json!({
                "rel": "AttachedFile",
                "url": url,
                "attributes": { "comment": comment },
            }),
        }
    }
}

/// Wrap rich text the way the service's editor stores it.
pub(crate) fn div_wrap(text: &str) -> String {
    format!("<div>{text}</div>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_op_serializes_with_null_from() {
        let op = PatchOp::add_field(FIELD_TITLE, "A bug");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            json!({
                "op": "add",
                "path": "/fields/System.Title",
                "from": null,
                "value": "A bug",
            })
        );
    }

    #[test]
    fn relation_op_omits_from() {
        let op = PatchOp::attach_file("http://attachments/1");
        let json = serde_json::to_value(&op).unwrap();
        assert!(json.get("from").is_none());
        assert_eq!(json["path"], "/relations/-");
        assert_eq!(json["value"]["rel"], "AttachedFile");
        assert_eq!(json["value"]["url"], "http://attachments/1");
    }

    #[test]
    fn relation_op_with_comment_carries_attributes() {
        let op = PatchOp::attach_file_with_comment("http://attachments/2", "screenshot");
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["value"]["attributes"]["comment"], "screenshot");
    }

    #[test]
    fn div_wrap_encloses_text() {
        assert_eq!(div_wrap("steps"), "<div>steps</div>");
    }
}
