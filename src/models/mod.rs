//! Azure DevOps API model types.

mod attachment;
mod backlog;
mod builder;
mod project;
mod query;
mod tag;
mod team;
mod work_item_type;
mod workitem;

pub use attachment::*;
pub use backlog::{Backlog, BacklogWorkItemType};
pub use builder::{AttachmentSource, WorkItemBuilder};
pub use project::*;
pub use query::*;
pub use tag::*;
pub use team::*;
pub use work_item_type::*;
pub use workitem::{ProjectRef, TextAreaField, Workitem};

pub(crate) use backlog::BacklogWorkItemsResponse;
