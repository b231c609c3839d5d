//! Work-item operations.
//!
//! The repository is the operation surface for creating, fetching,
//! searching, updating and commenting on work items. It is handed out by
//! [`AdoClient::work_items`](crate::AdoClient::work_items) and shares the
//! client's gateway and configuration.

use serde_json::{json, Value};

use crate::client::{AdoClient, API_VERSION};
use crate::error::{AdoError, Result};
use crate::http::read_json;
use crate::models::{AttachmentReference, Workitem};
use crate::patch::{self, div_wrap, PatchOp, CONTENT_TYPE_JSON, CONTENT_TYPE_JSON_PATCH};

const ATTACHMENT_COMMENT: &str = "Added by adoapi";

/// Repository for work-item operations.
#[derive(Debug, Clone)]
pub struct WorkitemRepository {
    client: AdoClient,
}

impl WorkitemRepository {
    pub(crate) fn new(client: AdoClient) -> Self {
        Self { client }
    }

    /// Create a Bug with a fixed patch body: title, repro steps, optional
    /// attachments and optional tags.
    #[deprecated(note = "use WorkItemBuilder for new code")]
    #[tracing::instrument(skip(self, description, attachments, tags))]
    pub async fn create_bug(
        &self,
        title: &str,
        description: &str,
        attachments: &[AttachmentReference],
        tags: &[String],
    ) -> Result<Workitem> {
        let url = self.client.project_api_url(
            "wit/workitems/$Bug",
            &format!("api-version={API_VERSION}"),
        )?;

        let mut body = vec![
            PatchOp::add_field(patch::FIELD_TITLE, title),
            PatchOp::add_field(patch::FIELD_REPRO_STEPS, div_wrap(description)),
        ];
        for attachment in attachments {
            body.push(PatchOp::attach_file_with_comment(
                &attachment.url,
                ATTACHMENT_COMMENT,
            ));
        }
        if !tags.is_empty() {
            body.push(PatchOp::add_field(patch::FIELD_TAGS, tags.join(";")));
        }

        let response = self
            .client
            .gateway()
            .post(url, &body, CONTENT_TYPE_JSON_PATCH)
            .await?;

        let payload: Value = read_json(response).await?;
        Workitem::from_json(&payload, &self.client)
    }

    /// Replace the repro steps of a work item and append attachments.
    #[tracing::instrument(skip(self, repro_steps_text, attachments), fields(id = %workitem.id()))]
    pub async fn update_repro_steps_and_attachments(
        &self,
        workitem: &Workitem,
        repro_steps_text: &str,
        attachments: &[AttachmentReference],
    ) -> Result<()> {
        let url = self.client.project_api_url(
            &format!("wit/workitems/{}", workitem.id()),
            &format!("api-version={API_VERSION}"),
        )?;

        let mut body = vec![PatchOp::add_field(
            patch::FIELD_REPRO_STEPS,
            div_wrap(repro_steps_text),
        )];
        for attachment in attachments {
            body.push(PatchOp::attach_file_with_comment(
                &attachment.url,
                ATTACHMENT_COMMENT,
            ));
        }

        self.client
            .gateway()
            .patch(url, &body, CONTENT_TYPE_JSON_PATCH)
            .await?;
        Ok(())
    }

    /// Add a comment to a work item.
    pub async fn add_comment(&self, workitem: &Workitem, comment_text: &str) -> Result<()> {
        workitem.add_comment(comment_text).await
    }

    /// Upload raw bytes as an attachment; the returned reference is what
    /// later relation operations point at.
    #[tracing::instrument(skip(self, content))]
    pub async fn upload_attachment(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentReference> {
        let url = self.client.project_api_url(
            "wit/attachments",
            &format!(
                "fileName={}&api-version={API_VERSION}",
                urlencoding::encode(file_name)
            ),
        )?;

        let response = self
            .client
            .gateway()
            .post_bytes(url, content, "application/octet-stream")
            .await?;

        read_json(response).await
    }

    /// Fetch a work item by its full API URL.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_url(&self, api_url: &str) -> Result<Workitem> {
        let url = url::Url::parse(api_url)?;
        let response = self.client.gateway().get(url).await?;
        let payload: Value = read_json(response).await?;
        Workitem::from_json(&payload, &self.client)
    }

    /// Fetch work items by id, in request order.
    ///
    /// An empty id list returns an empty result without touching the
    /// network.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_ids(&self, ids: &[u64]) -> Result<Vec<Workitem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = self.client.project_api_url(
            "wit/workitems",
            &format!("api-version={API_VERSION}&ids={joined}"),
        )?;

        let response = self.client.gateway().get(url).await?;
        let payload: Value = read_json(response).await?;
        let rows = payload
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdoError::Mapping("work item listing is missing 'value'".to_string())
            })?;

        rows.iter()
            .map(|row| Workitem::from_json(row, &self.client))
            .collect()
    }

    /// Full-text search for exactly one work item.
    ///
    /// The request asks for the top result only; the reported `count`
    /// still decides the outcome: 0 fails with `WorkItemNotFound`, more
    /// than 1 with `WorkItemNotUnique`.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, search_text: &str) -> Result<Workitem> {
        let url = self.client.search_api_url(
            "search/workitemsearchresults",
            &format!("api-version={API_VERSION}"),
        )?;

        let body = json!({
            "searchText": search_text,
            "$skip": 0,
            "$top": 1,
            "filters": null,
            "$orderBy": {
                "field": "system.id",
                "sortOrder": "ASC"
            },
            "includeFacets": true
        });

        let response = self
            .client
            .gateway()
            .post(url, &body, CONTENT_TYPE_JSON)
            .await?;
        let payload: Value = read_json(response).await?;

        let count = payload
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| AdoError::Mapping("search result is missing 'count'".to_string()))?;

        if count == 0 {
            return Err(AdoError::WorkItemNotFound(search_text.to_string()));
        }
        if count > 1 {
            return Err(AdoError::WorkItemNotUnique(search_text.to_string()));
        }

        let result = payload
            .pointer("/results/0")
            .ok_or_else(|| AdoError::Mapping("search result has no entries".to_string()))?;
        Workitem::from_json(result, &self.client)
    }
}
