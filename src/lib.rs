//! Azure DevOps work-item API client library.
//!
//! A Rust library for the Azure DevOps REST API: work items, teams,
//! projects, backlogs, queries and attachments. One authenticated HTTP
//! call per operation, a uniform error taxonomy, and typed entities
//! mapped from the service's JSON payloads.
//!
//! # Quick Start
//!
//! ```no_run
//! use adoapi::{AdoClient, WorkItemBuilder};
//!
//! #[tokio::main]
//! async fn main() -> adoapi::Result<()> {
//!     // An empty username selects Bearer auth with a personal access token.
//!     let client = AdoClient::new("", "my-pat", "https://dev.azure.com/", "fabrikam", "fiber")?;
//!
//!     // Create a bug through the fluent builder
//!     let bug = WorkItemBuilder::bug(&client)
//!         .title("Crash on save")
//!         .repro_steps("Open a file, press save twice")
//!         .tags("urgent;editor")
//!         .create()
//!         .await?;
//!     println!("created {} ({})", bug.id(), bug.url());
//!
//!     // Fetch work items by id
//!     let items = client.work_items().get_by_ids(&[297, 299, 300]).await?;
//!     println!("fetched {} items", items.len());
//!
//!     // Walk the teams of the project
//!     for team in client.get_teams().await? {
//!         println!("team: {}", team.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`AdoClient`] — facade holding the immutable configuration; builds
//!   URLs per API area and exposes team/project/backlog/query listings.
//! - [`WorkitemRepository`] — the work-item operation surface (create,
//!   fetch, search, update, comment, attach), from
//!   [`AdoClient::work_items`].
//! - [`WorkItemBuilder`] — fluent accumulation of JSON-Patch operations,
//!   finished by one PATCH.
//! - [`HttpGateway`] — authenticated dispatch with the shared status
//!   discipline: 200 is success, 203 is an authentication failure, and
//!   every other outcome is a request failure.
//!
//! # Errors
//!
//! Every operation returns [`Result`]. No failure is retried or handled
//! internally; callers decide what to catch and what to log.

mod client;
mod error;
mod http;
mod models;
mod patch;
mod repository;

// Re-export core types
pub use client::AdoClient;
pub use error::{AdoError, Result};
pub use http::HttpGateway;
pub use patch::PatchOp;
pub use repository::WorkitemRepository;

// Re-export models
pub use models::{
    AttachmentReference,
    AttachmentSource,
    Backlog,
    BacklogWorkItemType,
    Project,
    ProjectRef,
    Query,
    Tag,
    Team,
    TextAreaField,
    WorkItemBuilder,
    WorkItemLink,
    WorkItemType,
    Workitem,
};
