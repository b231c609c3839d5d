//! Work-item entity and mapping.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::client::AdoClient;
use crate::error::{AdoError, Result};
use crate::patch::CONTENT_TYPE_JSON;

// Read-side field keys, matched exactly against `fields.<ns>.<name>`.
const FIELD_TITLE: &str = "System.Title";
const FIELD_STATE: &str = "System.State";
const FIELD_CREATED_DATE: &str = "System.CreatedDate";
const FIELD_ITERATION_PATH: &str = "System.IterationPath";
const FIELD_WORK_ITEM_TYPE: &str = "System.WorkItemType";
const FIELD_DESCRIPTION: &str = "System.Description";
const FIELD_REPRO_STEPS: &str = "Microsoft.VSTS.TCM.ReproSteps";
const FIELD_SYSTEM_INFO: &str = "Microsoft.VSTS.TCM.SystemInfo";
const FIELD_ACCEPTANCE_CRITERIA: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";
const FIELD_RESOLUTION: &str = "Microsoft.VSTS.Common.Resolution";

/// The project a work item belongs to, as embedded in search results.
#[derive(Debug, Clone)]
pub struct ProjectRef {
    /// Project name.
    pub name: String,
    /// Project id, absent in some payload variants.
    pub id: Option<String>,
}

/// One rich-text field of a work item, keyed by its service field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAreaField {
    /// Service field key, e.g. "System.Description".
    pub key: &'static str,
    /// Human-readable field name.
    pub display_name: &'static str,
    /// Field content as stored by the service.
    pub content: String,
}

/// An Azure DevOps work item.
///
/// Constructed only through [`Workitem::from_json`]. The entity keeps a
/// handle to the owning client so follow-up operations (commenting,
/// resolving the HTML link, inlining embedded images) can reach the
/// service; the handle is never part of the serialized representation.
#[derive(Debug, Clone)]
pub struct Workitem {
    id: String,
    title: String,
    project: Option<ProjectRef>,
    url: String,
    state: String,
    created_date: String,
    iteration_path: String,
    work_item_type: String,
    description: String,
    repro_steps: String,
    acceptance_criteria: String,
    system_info: String,
    resolution: String,
    html_link: OnceLock<String>,
    client: AdoClient,
}

impl Workitem {
    /// Map a work-item JSON payload into an entity.
    ///
    /// `id` and `url` are required; every rich-text field defaults to an
    /// empty string when absent. Unknown fields are ignored.
    pub fn from_json(data: &Value, client: &AdoClient) -> Result<Self> {
        let id = match data.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(AdoError::Mapping(
                    "work item payload is missing 'id'".to_string(),
                ))
            }
        };

        let url = data
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| AdoError::Mapping("work item payload is missing 'url'".to_string()))?
            .to_string();

        let fields = data.get("fields").and_then(Value::as_object);
        let field = |key: &str| -> String {
            fields
                .and_then(|f| f.get(key))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        let project = data
            .get("project")
            .and_then(Value::as_object)
            .and_then(|p| {
                let name = p.get("name")?.as_str()?.to_string();
                let id = p.get("id").and_then(Value::as_str).map(str::to_string);
                Some(ProjectRef { name, id })
            });

        let html_link = OnceLock::new();
        if let Some(href) = data
            .pointer("/_links/html/href")
            .and_then(Value::as_str)
        {
            let _ = html_link.set(href.to_string());
        }

        Ok(Self {
            id,
            title: field(FIELD_TITLE),
            project,
            url,
            state: field(FIELD_STATE),
            created_date: field(FIELD_CREATED_DATE),
            iteration_path: field(FIELD_ITERATION_PATH),
            work_item_type: field(FIELD_WORK_ITEM_TYPE),
            description: field(FIELD_DESCRIPTION),
            repro_steps: field(FIELD_REPRO_STEPS),
            acceptance_criteria: field(FIELD_ACCEPTANCE_CRITERIA),
            system_info: field(FIELD_SYSTEM_INFO),
            resolution: field(FIELD_RESOLUTION),
            html_link,
            client: client.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Name of the owning project, empty when the payload carried none.
    pub fn project_name(&self) -> &str {
        self.project.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    /// Canonical API locator of this work item.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Whether the work item is in the "Done" state (exact match).
    pub fn is_done(&self) -> bool {
        self.state == "Done"
    }

    pub fn created_date(&self) -> &str {
        &self.created_date
    }

    pub fn iteration_path(&self) -> &str {
        &self.iteration_path
    }

    pub fn work_item_type(&self) -> &str {
        &self.work_item_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn repro_steps(&self) -> &str {
        &self.repro_steps
    }

    pub fn acceptance_criteria(&self) -> &str {
        &self.acceptance_criteria
    }

    pub fn system_info(&self) -> &str {
        &self.system_info
    }

    pub fn resolution(&self) -> &str {
        &self.resolution
    }

    /// The rich-text fields that have content, in the fixed order
    /// Description, Repro Steps, System Info, Acceptance Criteria,
    /// Resolution.
    pub fn text_area_fields(&self) -> Vec<TextAreaField> {
        let candidates = [
            (FIELD_DESCRIPTION, "Description", &self.description),
            (FIELD_REPRO_STEPS, "Repro Steps", &self.repro_steps),
            (FIELD_SYSTEM_INFO, "System Info", &self.system_info),
            (
                FIELD_ACCEPTANCE_CRITERIA,
                "Acceptance Criteria",
                &self.acceptance_criteria,
            ),
            (FIELD_RESOLUTION, "Resolution", &self.resolution),
        ];

        candidates
            .into_iter()
            .filter(|(_, _, content)| !content.is_empty())
            .map(|(key, display_name, content)| TextAreaField {
                key,
                display_name,
                content: content.clone(),
            })
            .collect()
    }

    /// Like [`text_area_fields`](Self::text_area_fields), but every
    /// `<img>` tag pointing at this organization's attachment storage is
    /// replaced with an inline `data:` URI, so the content renders
    /// outside the service.
    pub async fn text_area_fields_expanded(&self) -> Result<Vec<TextAreaField>> {
        let mut fields = self.text_area_fields();
        for field in &mut fields {
            field.content = self.expand_images(&field.content).await?;
        }
        Ok(fields)
    }

    /// Inline organization-hosted images as base64 data URIs.
    ///
    /// Splits on `<img src="{organization base URL}`; for each following
    /// segment the substring up to the closing quote is the attachment
    /// path, which is downloaded through the authenticated gateway. A
    /// segment without a closing quote is emitted unmodified.
    async fn expand_images(&self, content: &str) -> Result<String> {
        let org_base = self.client.organization_base_url();
        let marker = format!("<img src=\"{org_base}");

        let mut parts = content.split(marker.as_str());
        let mut out = String::from(parts.next().unwrap_or(""));

        for part in parts {
            let Some(end) = part.find('"') else {
                // Malformed markup; keep the original segment.
                out.push_str(&marker);
                out.push_str(part);
                continue;
            };

            let suffix = &part[..end];
            let rest = &part[end..];

            let attachment_url = url::Url::parse(&format!("{org_base}{suffix}"))?;
            let (bytes, content_type) = self.client.gateway().download(attachment_url).await?;

            let mime = content_type
                .as_deref()
                .map(|c| c.split(';').next().unwrap_or(c).trim().to_string())
                .unwrap_or_else(|| "image".to_string());

            out.push_str("<img src=\"data:");
            out.push_str(&mime);
            out.push_str(";base64,");
            out.push_str(&BASE64.encode(&bytes));
            out.push_str(rest);
        }

        Ok(out)
    }

    /// The web (HTML) link of this work item.
    ///
    /// Absent from most payloads; resolved on first access with one extra
    /// lookup by API URL and memoized for the lifetime of the entity.
    /// The cache cell is single-assignment, so concurrent first accesses
    /// race only on who fetches, never on the stored value.
    pub async fn html_link(&self) -> Result<String> {
        if let Some(link) = self.html_link.get() {
            return Ok(link.clone());
        }

        let fetched = self.client.work_items().get_by_url(&self.url).await?;
        let link = fetched.html_link.get().cloned().ok_or_else(|| {
            AdoError::Mapping(format!("work item {} has no html link", self.id))
        })?;

        Ok(self.html_link.get_or_init(|| link).clone())
    }

    /// Add a comment to this work item.
    pub async fn add_comment(&self, comment_text: &str) -> Result<()> {
        let url = self.client.project_api_url(
            &format!("wit/workitems/{}/comments", self.id),
            &format!("api-version={}", crate::client::API_VERSION_COMMENTS),
        )?;

        let body = serde_json::json!({ "text": comment_text });
        self.client
            .gateway()
            .post(url, &body, CONTENT_TYPE_JSON)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client() -> AdoClient {
        AdoClient::new("user", "secret", "http://fake/", "org", "project").unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "id": 789,
            "url": "http://fake/org/project/_apis/wit/workItems/789",
            "fields": {
                "System.Title": "From payload",
                "System.State": "New",
                "System.CreatedDate": "2024-02-01T10:00:00Z",
                "System.IterationPath": "project\\Sprint 3",
                "System.WorkItemType": "Task",
                "System.Description": "Description",
                "Microsoft.VSTS.TCM.ReproSteps": "Steps",
                "Microsoft.VSTS.Common.AcceptanceCriteria": "Criteria",
                "Microsoft.VSTS.TCM.SystemInfo": "Info",
                "Microsoft.VSTS.Common.Resolution": "Resolved"
            },
            "project": {"name": "Test Project", "id": "proj-456"}
        })
    }

    #[test]
    fn maps_full_payload() {
        let workitem = Workitem::from_json(&full_payload(), &test_client()).unwrap();

        assert_eq!(workitem.id(), "789");
        assert_eq!(workitem.title(), "From payload");
        assert_eq!(workitem.state(), "New");
        assert_eq!(workitem.created_date(), "2024-02-01T10:00:00Z");
        assert_eq!(workitem.iteration_path(), "project\\Sprint 3");
        assert_eq!(workitem.work_item_type(), "Task");
        assert_eq!(workitem.project_name(), "Test Project");
        assert_eq!(workitem.resolution(), "Resolved");
    }

    #[test]
    fn string_id_is_accepted() {
        let payload = json!({"id": "wi-1", "url": "http://fake/wi-1", "fields": {}});
        let workitem = Workitem::from_json(&payload, &test_client()).unwrap();
        assert_eq!(workitem.id(), "wi-1");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let payload = json!({
            "id": 1,
            "url": "http://fake/wi/1",
            "fields": {"System.Title": "Sparse"}
        });

        let workitem = Workitem::from_json(&payload, &test_client()).unwrap();
        assert_eq!(workitem.description(), "");
        assert_eq!(workitem.repro_steps(), "");
        assert_eq!(workitem.acceptance_criteria(), "");
        assert_eq!(workitem.system_info(), "");
        assert_eq!(workitem.resolution(), "");
        assert_eq!(workitem.project_name(), "");
    }

    #[test]
    fn missing_id_fails_mapping() {
        let payload = json!({"url": "http://fake/wi", "fields": {}});
        let err = Workitem::from_json(&payload, &test_client()).unwrap_err();
        assert!(matches!(err, AdoError::Mapping(_)));
    }

    #[test]
    fn missing_url_fails_mapping() {
        let payload = json!({"id": 1, "fields": {}});
        let err = Workitem::from_json(&payload, &test_client()).unwrap_err();
        assert!(matches!(err, AdoError::Mapping(_)));
    }

    #[test]
    fn is_done_matches_exactly() {
        let client = test_client();
        for (state, done) in [
            ("Done", true),
            ("done", false),
            ("DONE", false),
            ("Completed", false),
            ("", false),
        ] {
            let payload = json!({
                "id": 1,
                "url": "http://fake/wi/1",
                "fields": {"System.State": state}
            });
            let workitem = Workitem::from_json(&payload, &client).unwrap();
            assert_eq!(workitem.is_done(), done, "state {state:?}");
        }
    }

    #[test]
    fn text_area_fields_keep_fixed_order_and_skip_empty() {
        let workitem = Workitem::from_json(&full_payload(), &test_client()).unwrap();
        let fields = workitem.text_area_fields();

        let keys: Vec<&str> = fields.iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec![
                "System.Description",
                "Microsoft.VSTS.TCM.ReproSteps",
                "Microsoft.VSTS.TCM.SystemInfo",
                "Microsoft.VSTS.Common.AcceptanceCriteria",
                "Microsoft.VSTS.Common.Resolution",
            ]
        );

        let names: Vec<&str> = fields.iter().map(|f| f.display_name).collect();
        assert_eq!(
            names,
            vec![
                "Description",
                "Repro Steps",
                "System Info",
                "Acceptance Criteria",
                "Resolution",
            ]
        );
    }

    #[test]
    fn text_area_fields_empty_when_no_content() {
        let payload = json!({"id": 1, "url": "http://fake/wi/1", "fields": {}});
        let workitem = Workitem::from_json(&payload, &test_client()).unwrap();
        assert!(workitem.text_area_fields().is_empty());
    }

    #[test]
    fn text_area_fields_include_only_present_content() {
        let payload = json!({
            "id": 1,
            "url": "http://fake/wi/1",
            "fields": {
                "Microsoft.VSTS.TCM.ReproSteps": "Click the button",
                "Microsoft.VSTS.Common.Resolution": "Fixed"
            }
        });
        let workitem = Workitem::from_json(&payload, &test_client()).unwrap();

        let fields = workitem.text_area_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].key, "Microsoft.VSTS.TCM.ReproSteps");
        assert_eq!(fields[1].key, "Microsoft.VSTS.Common.Resolution");
    }

    #[test]
    fn html_link_from_payload_is_preset() {
        let payload = json!({
            "id": 1,
            "url": "http://fake/wi/1",
            "fields": {},
            "_links": {"html": {"href": "http://fake/web/wi/1"}}
        });
        let workitem = Workitem::from_json(&payload, &test_client()).unwrap();
        assert_eq!(workitem.html_link.get().map(String::as_str), Some("http://fake/web/wi/1"));
    }
}
