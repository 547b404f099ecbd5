//! Fetch repository and user data from the GitHub REST API

use crate::config::NetworkConfig;
use crate::error::{InsightError, Result};
use base64::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Outcome of a single upstream fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// The resource was returned and parsed
    Found(T),
    /// The upstream answered 404
    NotFound,
    /// Any other status, a transport error, or an unparseable body
    Failed(String),
}

impl<T> Fetched<T> {
    /// Keep the data, discarding the reason it is missing
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Found(value) => Fetched::Found(f(value)),
            Self::NotFound => Fetched::NotFound,
            Self::Failed(reason) => Fetched::Failed(reason),
        }
    }
}

/// Repository metadata from `/repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    /// Size in KB
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub homepage: Option<String>,
    pub license: Option<GitHubLicense>,
    pub clone_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLicense {
    pub name: Option<String>,
}

/// The newest commit on the default branch
#[derive(Debug, Clone, PartialEq)]
pub struct CommitActivity {
    /// Author date of the newest commit, as returned by GitHub
    pub last_commit: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubContributor {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub published_at: Option<String>,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowList {
    #[serde(default)]
    workflows: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<GitHubSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchItem {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub updated_at: String,
    pub owner: GitHubOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    #[serde(default)]
    pub avatar_url: String,
}

/// User metadata from `/users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUserRepo {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    pub description: Option<String>,
    pub language: Option<String>,
    pub html_url: String,
}

/// GitHub REST client sharing one connection pool across fetchers
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
}

impl GitHubClient {
    /// Build a client with GitHub authentication if a token is configured
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(token) = &config.github_token {
            let value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| InsightError::config(format!("Invalid GitHub token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| InsightError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Core repository metadata
    pub async fn repository(&self, owner: &str, repo: &str) -> Fetched<GitHubRepo> {
        self.get_json(&repo_path(owner, repo, ""), &[]).await
    }

    /// Date of the newest commit.
    ///
    /// An empty repository has no commits and yields `NotFound`.
    pub async fn commit_activity(&self, owner: &str, repo: &str) -> Fetched<CommitActivity> {
        let commits: Fetched<Vec<CommitEntry>> = self
            .get_json(&repo_path(owner, repo, "/commits"), &[("per_page", "1")])
            .await;

        match commits {
            Fetched::Found(commits) => {
                let Some(newest) = commits.first() else {
                    return Fetched::NotFound;
                };
                match newest.commit.author.as_ref().and_then(|a| a.date.clone()) {
                    Some(last_commit) => Fetched::Found(CommitActivity { last_commit }),
                    None => Fetched::Failed("newest commit has no author date".to_string()),
                }
            }
            Fetched::NotFound => Fetched::NotFound,
            Fetched::Failed(reason) => Fetched::Failed(reason),
        }
    }

    /// Top contributors, at most five
    pub async fn contributors(&self, owner: &str, repo: &str) -> Fetched<Vec<GitHubContributor>> {
        self.get_json(&repo_path(owner, repo, "/contributors"), &[("per_page", "5")])
            .await
            .map(|mut contributors: Vec<GitHubContributor>| {
                contributors.truncate(5);
                contributors
            })
    }

    /// Bytes of code per language, in the order GitHub lists them
    pub async fn languages(&self, owner: &str, repo: &str) -> Fetched<Vec<(String, u64)>> {
        self.get_json(&repo_path(owner, repo, "/languages"), &[])
            .await
            .map(|map: serde_json::Map<String, serde_json::Value>| {
                map.into_iter()
                    .map(|(name, bytes)| (name, bytes.as_u64().unwrap_or(0)))
                    .collect()
            })
    }

    /// Number of open issues (pull requests included, as GitHub counts them).
    ///
    /// Requests a single-item page and reads the total from the `last` link
    /// of the pagination header. Without that link the returned page is
    /// counted, so the result is at most 1 in that case.
    pub async fn open_issue_count(&self, owner: &str, repo: &str) -> Fetched<u64> {
        let response = match self
            .send(
                &repo_path(owner, repo, "/issues"),
                &[("state", "open"), ("per_page", "1")],
            )
            .await
        {
            Ok(response) => response,
            Err(reason) => return Fetched::Failed(reason),
        };

        let last_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_last_page);

        if let Some(count) = last_page {
            return Fetched::Found(count);
        }

        read_json::<Vec<serde_json::Value>>(response)
            .await
            .map(|issues| issues.len() as u64)
    }

    /// Latest releases, at most five
    pub async fn releases(&self, owner: &str, repo: &str) -> Fetched<Vec<GitHubRelease>> {
        self.get_json(&repo_path(owner, repo, "/releases"), &[("per_page", "5")])
            .await
            .map(|mut releases: Vec<GitHubRelease>| {
                releases.truncate(5);
                releases
            })
    }

    /// Whether any GitHub Actions workflow is defined
    pub async fn has_workflows(&self, owner: &str, repo: &str) -> Fetched<bool> {
        self.get_json(&repo_path(owner, repo, "/actions/workflows"), &[])
            .await
            .map(|list: WorkflowList| !list.workflows.is_empty())
    }

    /// Decoded text of a file at the repository root
    pub async fn file_content(&self, owner: &str, repo: &str, path: &str) -> Fetched<String> {
        let suffix = format!("/contents/{}", urlencoding::encode(path));
        let entry: Fetched<ContentEntry> =
            self.get_json(&repo_path(owner, repo, &suffix), &[]).await;

        match entry {
            Fetched::Found(ContentEntry {
                content: Some(content),
            }) => match decode_content(&content) {
                Some(text) => Fetched::Found(text),
                None => Fetched::Failed(format!("{} is not base64-encoded UTF-8", path)),
            },
            Fetched::Found(ContentEntry { content: None }) => {
                Fetched::Failed(format!("{} has no inline content", path))
            }
            Fetched::NotFound => Fetched::NotFound,
            Fetched::Failed(reason) => Fetched::Failed(reason),
        }
    }

    /// Repositories matching `query`, most starred first, at most twelve
    pub async fn search_repositories(&self, query: &str) -> Fetched<Vec<GitHubSearchItem>> {
        self.get_json(
            "/search/repositories",
            &[("q", query), ("sort", "stars"), ("order", "desc"), ("per_page", "12")],
        )
        .await
        .map(|response: SearchResponse| {
            let mut items = response.items;
            items.truncate(12);
            items
        })
    }

    /// Public profile of a user
    pub async fn user(&self, username: &str) -> Fetched<GitHubUser> {
        let path = format!("/users/{}", urlencoding::encode(username));
        self.get_json(&path, &[]).await
    }

    /// Up to 100 of a user's repositories, most recently updated first
    pub async fn user_repositories(&self, username: &str) -> Fetched<Vec<GitHubUserRepo>> {
        let path = format!("/users/{}/repos", urlencoding::encode(username));
        self.get_json(&path, &[("per_page", "100"), ("sort", "updated")])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Fetched<T> {
        match self.send(path, query).await {
            Ok(response) => read_json(response).await,
            Err(reason) => Fetched::Failed(reason),
        }
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Response, String> {
        let url = format!("{}{}", self.api_base, path);
        debug!("GET {}", url);

        self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| format!("GitHub request failed: {}", e))
    }
}

fn repo_path(owner: &str, repo: &str, suffix: &str) -> String {
    format!(
        "/repos/{}/{}{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        suffix
    )
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Fetched<T> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Fetched::NotFound;
    }

    if !status.is_success() {
        return Fetched::Failed(format!("HTTP {}", status));
    }

    match response.json::<T>().await {
        Ok(data) => Fetched::Found(data),
        Err(e) => Fetched::Failed(format!("Unexpected response body: {}", e)),
    }
}

/// Decode a base64 payload as GitHub returns it, wrapped at 60 columns
fn decode_content(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Extract the `page` parameter of the `rel="last"` entry of a Link header
fn extract_last_page(link_header: &str) -> Option<u64> {
    let last = link_header
        .split(',')
        .find(|link| link.contains("rel=\"last\""))?;

    let start = last.find('<')? + 1;
    let end = last.find('>')?;
    let url = Url::parse(last.get(start..end)?).ok()?;

    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_last_page() {
        let link_header = r#"<https://api.github.com/repositories/1/issues?state=open&per_page=1&page=2>; rel="next", <https://api.github.com/repositories/1/issues?state=open&per_page=1&page=347>; rel="last""#;
        assert_eq!(extract_last_page(link_header), Some(347));
    }

    #[test]
    fn test_extract_last_page_without_last() {
        let link_header = r#"<https://api.github.com/repositories/1/issues?per_page=1&page=1>; rel="prev", <https://api.github.com/repositories/1/issues?per_page=1&page=1>; rel="first""#;
        assert_eq!(extract_last_page(link_header), None);
        assert_eq!(extract_last_page(""), None);
    }

    #[test]
    fn test_decode_wrapped_content() {
        // "hello world\n" wrapped the way the contents API returns it
        assert_eq!(
            decode_content("aGVsbG8g\nd29ybGQK\n"),
            Some("hello world\n".to_string())
        );
    }

    #[test]
    fn test_decode_invalid_content() {
        assert_eq!(decode_content("!!not base64!!"), None);
        // valid base64 of invalid UTF-8 (0xff 0xfe)
        assert_eq!(decode_content("//4="), None);
    }

    #[test]
    fn test_fetched_helpers() {
        let found: Fetched<Vec<u8>> = Fetched::Found(vec![1, 2]);
        assert!(found.is_found());
        assert_eq!(found.map(|v| v.len()), Fetched::Found(2));

        let missing: Fetched<Vec<u8>> = Fetched::NotFound;
        assert!(!missing.is_found());

        let failed: Fetched<u64> = Fetched::Failed("HTTP 500".to_string());
        assert_eq!(failed.found(), None);
    }

    #[test]
    fn test_repo_path_encodes_segments() {
        assert_eq!(repo_path("a b", "c", "/languages"), "/repos/a%20b/c/languages");
    }
}
