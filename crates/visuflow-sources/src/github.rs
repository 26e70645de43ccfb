//! GitHub repository tree input
//!
//! The git trees API returns a flat list of paths. [`nest_tree`] folds it into
//! nested objects keyed by path segment, with files as
//! `{ "type": "file", "size": .., "sha": .. }` leaves.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::{Result, SourceError};
use crate::source::DataSource;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// `owner/repo` extracted from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Accepts `https://<host>/owner/repo[/...]`, `github.com/owner/repo` and
    /// `owner/repo`, with or without a trailing slash or `.git` suffix.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || SourceError::InvalidRepoUrl(url.to_string());
        let trimmed = url.trim().trim_end_matches('/');
        let path = match trimmed.split_once("://") {
            // drop the host, whichever it is (GitHub Enterprise included)
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, p)| p),
            None => trimmed
                .strip_prefix("www.github.com/")
                .or_else(|| trimmed.strip_prefix("github.com/"))
                .unwrap_or(trimmed),
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next().ok_or_else(invalid)?;
        let repo = segments.next().ok_or_else(invalid)?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if repo.is_empty() {
            return Err(invalid());
        }

        Ok(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One entry of a recursive git tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeItem {
    pub path: String,
    /// `tree` for directories, `blob` for files, `commit` for submodules.
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeItem {
    pub fn is_dir(&self) -> bool {
        self.kind == "tree"
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeListing {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

/// Fold a flat tree listing into nested objects.
///
/// Directories come before files, then entries are ordered by path, so every
/// directory exists before anything is placed in it.
pub fn nest_tree(items: &[TreeItem]) -> Value {
    let mut sorted: Vec<&TreeItem> = items.iter().collect();
    sorted.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.path.cmp(&b.path),
    });

    let mut root = Map::new();
    'items: for item in sorted {
        let parts: Vec<&str> = item.path.split('/').collect();
        let Some((last, dirs)) = parts.split_last() else {
            continue;
        };

        let mut current = &mut root;
        for part in dirs {
            let next = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(map) = next else {
                tracing::debug!("Skipping {}: {} is not a directory", item.path, part);
                continue 'items;
            };
            current = map;
        }

        if item.is_dir() {
            current
                .entry(last.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        } else {
            current.insert(
                last.to_string(),
                json!({
                    "type": "file",
                    "size": item.size.unwrap_or(0),
                    "sha": item.sha,
                }),
            );
        }
    }

    Value::Object(root)
}

/// Minimal GitHub REST client for repository trees.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("visuflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        tracing::debug!("GET {}", url);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn default_branch(&self, repo: &RepoRef) -> Result<String> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        let info: RepoInfo = self.get_json(url).await?;
        Ok(info.default_branch)
    }

    /// Flat recursive listing of `branch`.
    pub async fn fetch_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeItem>> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_url, repo.owner, repo.repo, branch
        );
        let listing: TreeListing = self.get_json(url).await?;
        if listing.truncated {
            tracing::warn!(
                "Tree listing for {} was truncated by GitHub; showing {} entries",
                repo,
                listing.tree.len()
            );
        }
        Ok(listing.tree)
    }

    /// Default branch tree, nested by path segment.
    pub async fn fetch_repo_structure(&self, repo: &RepoRef) -> Result<Value> {
        let branch = self.default_branch(repo).await?;
        tracing::info!("Fetching {} at {}", repo, branch);
        let items = self.fetch_tree(repo, &branch).await?;
        Ok(nest_tree(&items))
    }
}

/// A repository on GitHub.
#[derive(Debug, Clone)]
pub struct GithubSource {
    pub client: GithubClient,
    pub repo: RepoRef,
}

impl GithubSource {
    pub fn new(client: GithubClient, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            repo: RepoRef::parse(url)?,
        })
    }
}

#[async_trait]
impl DataSource for GithubSource {
    fn describe(&self) -> String {
        format!("github:{}", self.repo)
    }

    async fn load(&self) -> Result<Value> {
        self.client.fetch_repo_structure(&self.repo).await
    }
}
