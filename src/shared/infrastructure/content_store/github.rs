// GitHub Contents API implementation of the ContentStore port.
//
// Responsibilities
// - Compose `/repos/{owner}/{repo}/contents/{path}?ref={branch}` with every path segment percent-encoded.
// - Authenticate with `Authorization: token ...`; the token only lives in this struct.
// - Look up the current `sha` before each PUT and send it along when the path already exists.
// - Map HTTP failures onto the ContentStoreError taxonomy. No retries.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::shared::infrastructure::content_store::{
    ContentStore, ContentStoreError, RemoteFile, RemoteRevision,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_CONTENT_URL: &str = "https://raw.githubusercontent.com";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Repository coordinates and access token for one session. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub access_token: String,
}

impl RemoteCredentials {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            access_token: access_token.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.owner, &self.repo, &self.branch, &self.access_token]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub raw_content_url: String,
    pub timeout: Duration,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_content_url: DEFAULT_RAW_CONTENT_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    sha: String,
}

#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutContentsResponse {
    content: PutContentsFile,
}

#[derive(Deserialize)]
struct PutContentsFile {
    sha: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

pub struct GitHubContentClient {
    credentials: RemoteCredentials,
    settings: GitHubSettings,
    http: Client,
}

impl GitHubContentClient {
    pub fn new(
        credentials: RemoteCredentials,
        settings: GitHubSettings,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_V3));
        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("fundraiser_store/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            credentials,
            settings,
            http,
        })
    }

    pub fn credentials(&self) -> &RemoteCredentials {
        &self.credentials
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_url.trim_end_matches('/'),
            urlencoding::encode(&self.credentials.owner),
            urlencoding::encode(&self.credentials.repo),
            encode_path(path)
        )
    }

    fn authorization(&self) -> String {
        format!("token {}", self.credentials.access_token)
    }

    async fn read_revision(&self, path: &str) -> Result<Option<RemoteRevision>, ContentStoreError> {
        match self.read(path).await {
            Ok(file) => Ok(Some(file.revision)),
            Err(ContentStoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ContentStore for GitHubContentClient {
    async fn read(&self, path: &str) -> Result<RemoteFile, ContentStoreError> {
        let url = self.contents_url(path);
        tracing::debug!(%url, "reading remote content");
        let response = self
            .http
            .get(&url)
            .query(&[("ref", self.credentials.branch.as_str())])
            .header(header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response, path).await?;
        let body: ContentsResponse = response
            .json()
            .await
            .map_err(|e| ContentStoreError::Malformed(e.to_string()))?;
        let encoded_content = body.content.ok_or_else(|| {
            ContentStoreError::Malformed(format!("{path} has no inline content"))
        })?;
        Ok(RemoteFile {
            encoded_content,
            revision: RemoteRevision(body.sha),
        })
    }

    async fn write(
        &self,
        path: &str,
        encoded_content: &str,
        commit_message: &str,
    ) -> Result<RemoteRevision, ContentStoreError> {
        let current = self.read_revision(path).await?;
        let body = PutContentsBody {
            message: commit_message,
            content: encoded_content,
            branch: &self.credentials.branch,
            sha: current.as_ref().map(RemoteRevision::as_str),
        };
        let url = self.contents_url(path);
        tracing::debug!(%url, updating = current.is_some(), "writing remote content");
        let response = self
            .http
            .put(&url)
            .header(header::AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response, path).await?;
        let body: PutContentsResponse = response
            .json()
            .await
            .map_err(|e| ContentStoreError::Malformed(e.to_string()))?;
        let revision = RemoteRevision(body.content.sha);
        tracing::info!(path, %revision, "remote content written");
        Ok(revision)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.settings.raw_content_url.trim_end_matches('/'),
            urlencoding::encode(&self.credentials.owner),
            urlencoding::encode(&self.credentials.repo),
            encode_path(&self.credentials.branch),
            encode_path(path)
        )
    }
}

/// Percent-encode each segment of a store-relative POSIX path.
pub fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn transport_error(e: reqwest::Error) -> ContentStoreError {
    ContentStoreError::Transient(e.to_string())
}

async fn check_status(response: Response, path: &str) -> Result<Response, ContentStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    Err(classify_failure(status, message, path))
}

fn classify_failure(status: StatusCode, message: String, path: &str) -> ContentStoreError {
    match status {
        StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
            ContentStoreError::Transient(format!("{status}: {message}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ContentStoreError::Auth(format!("{status}: {message}"))
        }
        StatusCode::NOT_FOUND => ContentStoreError::NotFound {
            path: path.to_string(),
        },
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => ContentStoreError::Conflict {
            path: path.to_string(),
            message,
        },
        _ => ContentStoreError::Transient(format!("{status}: {message}")),
    }
}
