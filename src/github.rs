use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, Response, StatusCode, Url,
};
use serde::Deserialize;

use crate::{
    config::ProviderConfig,
    error::{BrowseError, Result},
    provider::TreeProvider,
    types::{DirectoryListing, Entry, EntryKind, RepositoryCoordinate, RepositorySummary},
};

const API_JSON: &str = "application/vnd.github.v3+json";

/// GitHub-backed tree provider
///
/// Fetches content using:
/// - the REST contents API for directory listings
/// - each file's `download_url` for raw text, or the contents API
///   (base64 payload) when no download URL exists
#[derive(Clone)]
pub struct GitHubProvider {
    client: Client,
    config: ProviderConfig,
}

#[derive(Deserialize)]
struct GitHubApiEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    sha: String,
    url: String,
    download_url: Option<String>,
}

#[derive(Deserialize)]
struct GitHubFilePayload {
    content: String,
    encoding: String,
}

#[derive(Deserialize)]
struct GitHubOwner {
    login: String,
    avatar_url: String,
}

#[derive(Deserialize)]
struct GitHubRepository {
    id: u64,
    name: String,
    owner: GitHubOwner,
    description: Option<String>,
}

impl GitHubProvider {
    /// Create a provider from an explicit configuration
    ///
    /// The token, if any, is attached to every request as
    /// `Authorization: token <token>`.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let config = config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
                BrowseError::InvalidConfig {
                    message: "token contains characters not allowed in a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build the contents API URL for a repository path
    ///
    /// Every segment is percent-escaped, so names containing `?`, `#` or `%`
    /// address the directory they name.
    fn contents_url(&self, coordinate: &RepositoryCoordinate, path: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.config.api_base_url).map_err(|e| BrowseError::InvalidConfig {
                message: format!("invalid api_base_url: {}", e),
            })?;
        url.path_segments_mut()
            .map_err(|_| BrowseError::InvalidConfig {
                message: format!("api_base_url cannot carry a path: {}", self.config.api_base_url),
            })?
            .pop_if_empty()
            .extend(["repos", coordinate.owner.as_str(), coordinate.name.as_str(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Whether a fetch URL points at the JSON API rather than raw content
    fn is_api_url(&self, url: &str) -> bool {
        url.strip_prefix(&self.config.api_base_url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
    }

    /// Check if an error is a rate limit error
    fn is_rate_limit_error(&self, status: StatusCode) -> bool {
        status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Map the response status onto our error taxonomy, returning the body on success
    async fn read_body(&self, response: Response, path: &str) -> Result<Bytes> {
        match response.status() {
            StatusCode::OK => Ok(response.bytes().await?),
            StatusCode::NOT_FOUND => Err(BrowseError::NotFound {
                path: path.to_string(),
            }),
            status if self.is_rate_limit_error(status) => {
                log::warn!("Rate limited while fetching {}", path);
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "GitHub API rate limit exceeded".to_string());
                Err(BrowseError::RateLimited { message })
            }
            status => {
                log::warn!("Unexpected status {} while fetching {}", status, path);
                let message = format!(
                    "Unexpected status {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                );
                Err(BrowseError::Malformed { message })
            }
        }
    }

    async fn get_api(&self, url: &str, path: &str) -> Result<Bytes> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).header(ACCEPT, API_JSON).send().await?;
        self.read_body(response, path).await
    }

    /// List the public repositories owned by `user`
    ///
    /// A blank user name yields an empty list without touching the network.
    pub async fn list_user_repositories(&self, user: &str) -> Result<Vec<RepositorySummary>> {
        let user = user.trim();
        if user.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/users/{}/repos", self.config.api_base_url, user);
        let body = self.get_api(&url, user).await?;
        let repos: Vec<GitHubRepository> = serde_json::from_slice(&body)?;

        Ok(repos
            .into_iter()
            .map(|r| RepositorySummary {
                id: r.id,
                name: r.name,
                owner: r.owner.login,
                avatar_url: r.owner.avatar_url,
                description: r.description,
            })
            .collect())
    }
}

fn into_entry(api: GitHubApiEntry) -> Entry {
    let kind = match api.entry_type.as_str() {
        "dir" => EntryKind::Directory,
        _ => EntryKind::File, // symlinks and submodules are shown as files
    };
    let fetch_url = match kind {
        EntryKind::Directory => api.url,
        EntryKind::File => api.download_url.unwrap_or(api.url),
    };

    Entry {
        name: api.name,
        path: api.path,
        kind,
        fetch_url,
        id: api.sha,
    }
}

fn decode_text(bytes: &[u8], url: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| BrowseError::Malformed {
        message: format!("{} is not UTF-8 text", url),
    })
}

#[async_trait]
impl TreeProvider for GitHubProvider {
    async fn list_directory(
        &self,
        coordinate: &RepositoryCoordinate,
        path: &str,
    ) -> Result<DirectoryListing> {
        let url = self.contents_url(coordinate, path)?;
        let body = self.get_api(url.as_str(), path).await?;

        // A file path yields a single object instead of an array
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        if !value.is_array() {
            return Err(BrowseError::Malformed {
                message: format!("{:?} is not a directory", path),
            });
        }
        let api_entries: Vec<GitHubApiEntry> = serde_json::from_value(value)?;

        Ok(DirectoryListing {
            path: path.to_string(),
            entries: api_entries.into_iter().map(into_entry).collect(),
        })
    }

    async fn fetch_file_text(&self, fetch_url: &str) -> Result<String> {
        if self.is_api_url(fetch_url) {
            let body = self.get_api(fetch_url, fetch_url).await?;
            let payload: GitHubFilePayload = serde_json::from_slice(&body)?;
            if payload.encoding != "base64" {
                return Err(BrowseError::Malformed {
                    message: format!("unsupported content encoding {:?}", payload.encoding),
                });
            }
            let cleaned: String = payload
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD.decode(cleaned).map_err(|e| BrowseError::Malformed {
                message: format!("invalid base64 content: {}", e),
            })?;
            return decode_text(&bytes, fetch_url);
        }

        log::debug!("GET {}", fetch_url);
        let response = self.client.get(fetch_url).send().await?;
        let body = self.read_body(response, fetch_url).await?;
        decode_text(&body, fetch_url)
    }

    fn identifier(&self) -> String {
        format!("github+{}", self.config.api_base_url)
    }
}
