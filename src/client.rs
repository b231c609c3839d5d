//! Azure DevOps API client facade.
//!
//! Holds the immutable configuration (organization, project, base URL,
//! credentials), assembles URLs per API area and delegates dispatch to
//! the [`HttpGateway`]. Work-item operations live on the repository
//! returned by [`AdoClient::work_items`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::{AdoError, Result};
use crate::http::{read_json, HttpGateway};
use crate::models::{
    Backlog, BacklogWorkItemsResponse, Project, Query, Tag, Team, WorkItemLink, WorkItemType,
};
use crate::repository::WorkitemRepository;

pub(crate) const API_VERSION: &str = "7.1";
pub(crate) const API_VERSION_COMMENTS: &str = "7.1-preview.3";
pub(crate) const API_VERSION_TEAMS_ORG: &str = "7.1-preview.3";
pub(crate) const API_VERSION_BACKLOGS: &str = "7.1-preview.1";
pub(crate) const API_VERSION_TAGS: &str = "7.1-preview.1";

const DEFAULT_SEARCH_URL: &str = "https://almsearch.dev.azure.com/";

/// Envelope of every Azure DevOps listing response.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct IterationsResponse {
    count: u64,
    #[serde(default)]
    value: Vec<Iteration>,
}

#[derive(Debug, Deserialize)]
struct Iteration {
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResponse {
    #[serde(default)]
    work_items: Vec<WorkItemLink>,
}

/// Azure DevOps API client.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool. All configuration is fixed at construction.
///
/// # Example
///
/// ```no_run
/// use adoapi::AdoClient;
///
/// # fn example() -> adoapi::Result<()> {
/// // Personal access token (empty username selects Bearer auth)
/// let client = AdoClient::new("", "my-pat", "https://dev.azure.com/", "fabrikam", "fiber")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdoClient {
    gateway: HttpGateway,
    base_url: Arc<Url>,
    search_base_url: Arc<Url>,
    organization: String,
    project: String,
}

impl std::fmt::Debug for AdoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdoClient")
            .field("base_url", &self.base_url.as_str())
            .field("organization", &self.organization)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl AdoClient {
    /// Create a new client.
    ///
    /// An empty `username` means `secret` is a personal access token sent
    /// as a Bearer token; otherwise Basic auth is computed from both.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn new(
        username: &str,
        secret: &str,
        base_url: &str,
        organization: &str,
        project: &str,
    ) -> Result<Self> {
        let base_url = Self::parse_base(base_url)?;
        let search_base_url = Self::parse_base(DEFAULT_SEARCH_URL)?;

        Ok(Self {
            gateway: HttpGateway::new(username, secret)?,
            base_url: Arc::new(base_url),
            search_base_url: Arc::new(search_base_url),
            organization: organization.to_string(),
            project: project.to_string(),
        })
    }

    /// Override the host used for work-item search (defaults to the
    /// `almsearch.dev.azure.com` service).
    pub fn with_search_base_url(mut self, search_base_url: &str) -> Result<Self> {
        self.search_base_url = Arc::new(Self::parse_base(search_base_url)?);
        Ok(self)
    }

    fn parse_base(base_url: &str) -> Result<Url> {
        // Ensure base URL ends with /
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Url::parse(&normalized)?)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// The configured project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Base URL of the organization without a trailing slash, e.g.
    /// `https://dev.azure.com/fabrikam`. Embedded attachment links in
    /// rich-text fields start with this prefix.
    pub fn organization_base_url(&self) -> String {
        format!("{}{}", self.base_url, self.organization)
    }

    /// The low-level gateway, for raw authenticated requests.
    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    /// The repository carrying the work-item operations.
    pub fn work_items(&self) -> WorkitemRepository {
        WorkitemRepository::new(self.clone())
    }

    pub(crate) fn project_api_url(&self, resource: &str, query: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}/{}/_apis/{resource}?{query}",
            self.base_url, self.organization, self.project
        ))?)
    }

    pub(crate) fn org_api_url(&self, resource: &str, query: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}/_apis/{resource}?{query}",
            self.base_url, self.organization
        ))?)
    }

    pub(crate) fn team_api_url(&self, team_id: &str, resource: &str, query: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}/{}/{team_id}/_apis/{resource}?{query}",
            self.base_url, self.organization, self.project
        ))?)
    }

    pub(crate) fn search_api_url(&self, resource: &str, query: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}/{}/_apis/{resource}?{query}",
            self.search_base_url, self.organization, self.project
        ))?)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let response = self.gateway.get(url).await?;
        let listing: ListResponse<T> = read_json(response).await?;
        Ok(listing.value)
    }

    /// Get the teams of the configured project.
    #[tracing::instrument(skip(self))]
    pub async fn get_teams(&self) -> Result<Vec<Team>> {
        let url = self.org_api_url(
            &format!("projects/{}/teams", self.project),
            &format!("api-version={API_VERSION}"),
        )?;
        self.get_list(url).await
    }

    /// Get every team of the organization, across projects.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_teams(&self) -> Result<Vec<Team>> {
        let url = self.org_api_url("teams", &format!("api-version={API_VERSION_TEAMS_ORG}"))?;
        self.get_list(url).await
    }

    /// Get a single team of the configured project by id or name.
    #[tracing::instrument(skip(self))]
    pub async fn get_team(&self, team_id: &str) -> Result<Team> {
        let url = self.org_api_url(
            &format!("projects/{}/teams/{team_id}", self.project),
            &format!("api-version={API_VERSION}"),
        )?;
        let response = self.gateway.get(url).await?;
        read_json(response).await
    }

    /// Get the projects of the organization.
    #[tracing::instrument(skip(self))]
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let url = self.org_api_url("projects", &format!("api-version={API_VERSION}"))?;
        self.get_list(url).await
    }

    /// Get a single project by id or name.
    #[tracing::instrument(skip(self))]
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let url = self.org_api_url(
            &format!("projects/{project_id}"),
            &format!("api-version={API_VERSION}"),
        )?;
        let response = self.gateway.get(url).await?;
        read_json(response).await
    }

    /// Get the backlog levels of a team.
    #[tracing::instrument(skip(self, team), fields(team = %team.name))]
    pub async fn get_backlogs(&self, team: &Team) -> Result<Vec<Backlog>> {
        let url = self.team_api_url(
            &team.id,
            "work/backlogs",
            &format!("api-version={API_VERSION_BACKLOGS}"),
        )?;
        self.get_list(url).await
    }

    /// Get the work items on one backlog level of a team.
    #[tracing::instrument(skip(self, team), fields(team = %team.name))]
    pub async fn get_backlog_work_items(
        &self,
        team: &Team,
        backlog_id: &str,
    ) -> Result<Vec<WorkItemLink>> {
        let url = self.team_api_url(
            &team.id,
            &format!("work/backlogs/{backlog_id}/workItems"),
            &format!("api-version={API_VERSION_BACKLOGS}"),
        )?;
        let response = self.gateway.get(url).await?;
        let listing: BacklogWorkItemsResponse = read_json(response).await?;
        Ok(listing.work_items.into_iter().map(|e| e.target).collect())
    }

    /// Resolve the iteration path the team is currently in.
    ///
    /// Fails when the service reports zero or more than one current
    /// iteration.
    #[tracing::instrument(skip(self, team), fields(team = %team.name))]
    pub async fn get_current_iteration_path(&self, team: &Team) -> Result<String> {
        let url = self.team_api_url(
            &team.id,
            "work/teamsettings/iterations",
            &format!("$timeframe=current&api-version={API_VERSION}"),
        )?;

        let response = self.gateway.get(url).await?;
        let mut iterations: IterationsResponse = read_json(response).await?;

        let scope = format!("{}/{}/{}", self.organization, self.project, team.name);
        if iterations.count == 0 {
            return Err(AdoError::RequestFailed {
                message: format!("could not find current iteration for {scope}"),
                status_code: None,
            });
        }
        if iterations.count > 1 {
            return Err(AdoError::RequestFailed {
                message: format!("more than one current iteration found for {scope}"),
                status_code: None,
            });
        }

        iterations
            .value
            .pop()
            .map(|iteration| iteration.path)
            .ok_or_else(|| {
                AdoError::Mapping("iteration listing count disagrees with entries".to_string())
            })
    }

    /// Get the root query folders, expanded to the given depth.
    #[tracing::instrument(skip(self))]
    pub async fn get_root_query_folders(&self, depth: u32) -> Result<Vec<Query>> {
        let url = self.project_api_url(
            "wit/queries",
            &format!("$depth={depth}&api-version={API_VERSION}"),
        )?;
        self.get_list(url).await
    }

    /// Get every query one level below the root folders.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_queries(&self) -> Result<Vec<Query>> {
        let folders = self.get_root_query_folders(1).await?;
        Ok(flatten_root_folders(folders))
    }

    /// Run a saved query and return the matching work-item references.
    #[tracing::instrument(skip(self, team), fields(team = %team.name))]
    pub async fn get_query_result_by_id(
        &self,
        team: &Team,
        query_id: &str,
    ) -> Result<Vec<WorkItemLink>> {
        let url = self.team_api_url(
            &team.id,
            &format!("wit/wiql/{query_id}"),
            &format!("api-version={API_VERSION}"),
        )?;
        let response = self.gateway.get(url).await?;
        let result: WiqlResponse = read_json(response).await?;
        Ok(result.work_items)
    }

    /// Get the work-item types available in the project.
    #[tracing::instrument(skip(self))]
    pub async fn get_work_item_types(&self) -> Result<Vec<WorkItemType>> {
        let url =
            self.project_api_url("wit/workitemtypes", &format!("api-version={API_VERSION}"))?;
        self.get_list(url).await
    }

    /// Get the work-item tags defined in the project.
    #[tracing::instrument(skip(self))]
    pub async fn get_tags(&self) -> Result<Vec<Tag>> {
        let url = self.project_api_url("wit/tags", &format!("api-version={API_VERSION_TAGS}"))?;
        self.get_list(url).await
    }
}

/// Flatten one level of children out of root folders marked as having
/// children.
fn flatten_root_folders(folders: Vec<Query>) -> Vec<Query> {
    folders
        .into_iter()
        .filter(|folder| folder.has_children)
        .flat_map(|folder| folder.children)
        .collect()
}
