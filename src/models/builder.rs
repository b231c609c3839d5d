//! Fluent builder for creating work items.

use crate::client::{AdoClient, API_VERSION};
use crate::error::Result;
use crate::http::read_json;
use crate::models::attachment::AttachmentReference;
use crate::models::team::Team;
use crate::models::workitem::Workitem;
use crate::patch::{self, div_wrap, PatchOp, CONTENT_TYPE_JSON_PATCH};

/// Something that can be attached to a work item by URL: either a full
/// [`AttachmentReference`] or a raw URL string.
pub trait AttachmentSource {
    fn attachment_url(&self) -> &str;
}

impl AttachmentSource for AttachmentReference {
    fn attachment_url(&self) -> &str {
        &self.url
    }
}

impl AttachmentSource for &AttachmentReference {
    fn attachment_url(&self) -> &str {
        &self.url
    }
}

impl AttachmentSource for &str {
    fn attachment_url(&self) -> &str {
        self
    }
}

impl AttachmentSource for String {
    fn attachment_url(&self) -> &str {
        self
    }
}

/// Named field slots of the pending request body. Setting a slot twice
/// overwrites its value; the slot keeps its first-insertion position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSlot {
    Title,
    Description,
    ReproSteps,
    SystemInfo,
    AcceptanceCriteria,
    Resolution,
    Tags,
    AreaPath,
    IterationPath,
}

/// Accumulates JSON-Patch operations and creates a work item in one call.
///
/// Field setters overwrite their own slot (last write wins); attachments
/// are additive. [`create`](WorkItemBuilder::create) serializes the named
/// slots in first-insertion order followed by the attachment relations,
/// and issues a single PATCH. The builder is one-shot: `create` consumes
/// it.
///
/// # Example
///
/// ```no_run
/// use adoapi::{AdoClient, WorkItemBuilder};
///
/// # async fn example(client: AdoClient) -> adoapi::Result<()> {
/// let bug = WorkItemBuilder::bug(&client)
///     .title("Crash on save")
///     .repro_steps("Open a file, press save twice")
///     .create()
///     .await?;
/// println!("created work item {}", bug.id());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WorkItemBuilder {
    client: AdoClient,
    work_item_type: String,
    fields: Vec<(FieldSlot, PatchOp)>,
    relations: Vec<PatchOp>,
}

impl WorkItemBuilder {
    /// Start building a work item of an arbitrary type.
    pub fn new(client: &AdoClient, work_item_type: &str) -> Self {
        Self {
            client: client.clone(),
            work_item_type: work_item_type.to_string(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Start building a Bug.
    pub fn bug(client: &AdoClient) -> Self {
        Self::new(client, "Bug")
    }

    /// Start building a Product Backlog Item.
    pub fn product_backlog_item(client: &AdoClient) -> Self {
        Self::new(client, "Product Backlog Item")
    }

    /// Start building an Issue.
    pub fn issue(client: &AdoClient) -> Self {
        Self::new(client, "Issue")
    }

    /// Start building a User Story.
    pub fn user_story(client: &AdoClient) -> Self {
        Self::new(client, "User Story")
    }

    /// The work-item type this builder creates.
    pub fn work_item_type(&self) -> &str {
        &self.work_item_type
    }

    fn set_slot(mut self, slot: FieldSlot, op: PatchOp) -> Self {
        if let Some(entry) = self.fields.iter_mut().find(|(s, _)| *s == slot) {
            entry.1 = op;
        } else {
            self.fields.push((slot, op));
        }
        self
    }

    /// Set the title.
    pub fn title(self, title: &str) -> Self {
        self.set_slot(
            FieldSlot::Title,
            PatchOp::add_field(patch::FIELD_TITLE, title),
        )
    }

    /// Set the description. The text is wrapped in `<div>` tags the way
    /// the service's own editor stores rich text.
    pub fn description(self, description: &str) -> Self {
        self.set_slot(
            FieldSlot::Description,
            PatchOp::add_field(patch::FIELD_DESCRIPTION, div_wrap(description)),
        )
    }

    /// Set the repro steps, wrapped in `<div>` tags on write.
    pub fn repro_steps(self, repro_steps: &str) -> Self {
        self.set_slot(
            FieldSlot::ReproSteps,
            PatchOp::add_field(patch::FIELD_REPRO_STEPS, div_wrap(repro_steps)),
        )
    }

    /// Set the system info, wrapped in `<div>` tags on write.
    pub fn system_info(self, system_info: &str) -> Self {
        self.set_slot(
            FieldSlot::SystemInfo,
            PatchOp::add_field(patch::FIELD_SYSTEM_INFO, div_wrap(system_info)),
        )
    }

    /// Set the acceptance criteria, wrapped in `<div>` tags on write.
    pub fn acceptance_criteria(self, acceptance_criteria: &str) -> Self {
        self.set_slot(
            FieldSlot::AcceptanceCriteria,
            PatchOp::add_field(
                patch::FIELD_ACCEPTANCE_CRITERIA,
                div_wrap(acceptance_criteria),
            ),
        )
    }

    /// Set the resolution, wrapped in `<div>` tags on write.
    pub fn resolution(self, resolution: &str) -> Self {
        self.set_slot(
            FieldSlot::Resolution,
            PatchOp::add_field(patch::FIELD_RESOLUTION, div_wrap(resolution)),
        )
    }

    /// Set the tags from an already `;`-separated string.
    pub fn tags(self, tags: &str) -> Self {
        self.set_slot(FieldSlot::Tags, PatchOp::add_field(patch::FIELD_TAGS, tags))
    }

    /// Set the tags from a list of names, joined with `;`.
    pub fn tag_list<I>(self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let joined = tags
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(";");
        self.tags(&joined)
    }

    /// Set the area path.
    pub fn area_path(self, area_path: &str) -> Self {
        self.set_slot(
            FieldSlot::AreaPath,
            PatchOp::add_field(patch::FIELD_AREA_PATH, area_path),
        )
    }

    /// Set the iteration path.
    pub fn in_iteration_path(self, iteration_path: &str) -> Self {
        self.set_slot(
            FieldSlot::IterationPath,
            PatchOp::add_field(patch::FIELD_ITERATION_PATH, iteration_path),
        )
    }

    /// Set the iteration path to the team's current iteration. Issues one
    /// extra request to resolve it.
    pub async fn in_current_iteration_path(self, team: &Team) -> Result<Self> {
        let path = self.client.get_current_iteration_path(team).await?;
        Ok(self.in_iteration_path(&path))
    }

    /// Append one `AttachedFile` relation per attachment. Never
    /// deduplicated; calling this twice appends both batches.
    pub fn attachments<I>(mut self, attachments: I) -> Self
    where
        I: IntoIterator,
        I::Item: AttachmentSource,
    {
        for attachment in attachments {
            self.relations
                .push(PatchOp::attach_file(attachment.attachment_url()));
        }
        self
    }

    fn operations(&self) -> Vec<&PatchOp> {
        self.fields
            .iter()
            .map(|(_, op)| op)
            .chain(self.relations.iter())
            .collect()
    }

    /// Create the work item and map the service's response.
    ///
    /// Issues exactly one PATCH with the accumulated operations.
    #[tracing::instrument(skip(self), fields(work_item_type = %self.work_item_type))]
    pub async fn create(self) -> Result<Workitem> {
        let encoded_type = urlencoding::encode(&self.work_item_type);
        let url = self.client.project_api_url(
            &format!("wit/workitems/${encoded_type}"),
            &format!("api-version={API_VERSION}"),
        )?;

        let body = self.operations();
        let response = self
            .client
            .gateway()
            .patch(url, &body, CONTENT_TYPE_JSON_PATCH)
            .await?;

        let payload: serde_json::Value = read_json(response).await?;
        Workitem::from_json(&payload, &self.client)
    }
}
