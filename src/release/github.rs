//! GitHub REST implementation of [`ReleaseSource`].

use super::{Release, ReleaseRef, ReleaseSource};
use crate::config::UpdaterConfig;
use crate::constants::GITHUB_TOKEN_ENV;
use crate::core::{Result, UpdaterError};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use tracing::debug;

/// Talks to `/repos/{owner}/{repo}` on the GitHub API.
///
/// The archive link is resolved the way the GitHub clients do it: the
/// `zipball` endpoint answers with a redirect to a short-lived download URL,
/// and that `Location` is returned instead of being followed.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    api_base_url: String,
    owner: String,
    repo: String,
    default_branch: String,
}

impl GitHubReleases {
    /// Build a client from the repository coordinates in `config`.
    ///
    /// A token in `GITHUB_TOKEN` is sent as a bearer token, which raises the
    /// API rate limit.
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        let token = std::env::var(GITHUB_TOKEN_ENV).ok();
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(api_headers(token.as_deref()))
            .redirect(Policy::none())
            .build()
            .map_err(|e| UpdaterError::network("build HTTP client", e))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            default_branch: config.default_branch.clone(),
        })
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base_url, self.owner, self.repo)
    }
}

/// Headers sent with every API request.
fn api_headers(token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty())
        && let Ok(mut value) = HeaderValue::from_str(&format!("Bearer {token}"))
    {
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    headers
}

impl ReleaseSource for GitHubReleases {
    async fn archive_url(&self, reference: &ReleaseRef) -> Result<String> {
        let operation = format!("resolve archive link for {reference}");
        let url = format!("{}/zipball/{}", self.repo_url(), reference.git_ref(&self.default_branch));
        debug!("Requesting archive link from {}", url);

        let response =
            self.client.get(&url).send().await.map_err(|e| UpdaterError::network(&operation, e))?;
        let status = response.status();

        if status.is_redirection() {
            return response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| UpdaterError::network(&operation, "redirect without a Location header"));
        }

        if status.is_success() {
            return Ok(url);
        }

        Err(UpdaterError::network(operation, format!("HTTP {status}")))
    }

    async fn list_releases(&self, limit: usize) -> Result<Vec<Release>> {
        let operation = "list releases";
        let url = format!("{}/releases", self.repo_url());
        debug!("Listing up to {} releases from {}", limit, url);

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", limit.to_string()), ("page", "1".to_string())])
            .send()
            .await
            .map_err(|e| UpdaterError::network(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::network(operation, format!("HTTP {status}")));
        }

        response.json::<Vec<Release>>().await.map_err(|e| UpdaterError::network(operation, e))
    }
}
