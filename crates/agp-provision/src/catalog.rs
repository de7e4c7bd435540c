//! Project catalog backed by the GitHub GraphQL API
//!
//! One query lists the organization's private repositories; eligible
//! project workspaces are the non-archived ones whose name carries the
//! project suffix. The catalog is advisory only: every failure path
//! collapses into an empty list so provisioning can continue without it.

use serde::Deserialize;
use tracing::debug;

/// Organization whose repositories make up the catalog
const ORGANIZATION: &str = "artemeon";

/// Suffix marking a repository as a project workspace
const PROJECT_SUFFIX: &str = "-project";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
struct RepositoryConnection {
    edges: Vec<RepositoryEdge>,
}

#[derive(Debug, Deserialize)]
struct RepositoryEdge {
    node: RepositoryNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: String,
    is_archived: bool,
}

/// Client for the project catalog
pub struct CatalogClient {
    api_base: String,
}

impl CatalogClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    /// Names of all eligible project repositories, ascending
    ///
    /// Best-effort: transport, status, and parse failures all yield an
    /// empty list.
    pub async fn fetch_project_names(&self, token: &str) -> Vec<String> {
        match self.query_repositories(token).await {
            Ok(nodes) => filter_project_names(nodes),
            Err(err) => {
                debug!("Project catalog unavailable: {err}");
                Vec::new()
            }
        }
    }

    async fn query_repositories(&self, token: &str) -> reqwest::Result<Vec<RepositoryNode>> {
        let query = format!(
            "query {{ organization(login: \"{ORGANIZATION}\") {{ \
             repositories(first: 100, privacy: PRIVATE) {{ \
             edges {{ node {{ name isArchived }} }} }} }} }}"
        );

        let client = reqwest::Client::builder()
            .user_agent(concat!("agp-installer/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let response = client
            .post(format!("{}/graphql", self.api_base))
            .header("Accept", "application/vnd.github.v3+json")
            .header("Authorization", format!("token {token}"))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResponse = response.json().await?;
        Ok(body
            .data
            .and_then(|data| data.organization)
            .map(|org| org.repositories.edges.into_iter().map(|edge| edge.node).collect())
            .unwrap_or_default())
    }
}

/// Keep non-archived project repositories, sorted ascending by name
fn filter_project_names(nodes: Vec<RepositoryNode>) -> Vec<String> {
    let mut names: Vec<String> = nodes
        .into_iter()
        .filter(|node| !node.is_archived && node.name.ends_with(PROJECT_SUFFIX))
        .map(|node| node.name)
        .collect();
    names.sort();
    names
}
