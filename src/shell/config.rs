use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::modules::projects::use_cases::sync_projects::handler::DocumentSyncEngine;
use crate::shared::infrastructure::content_store::github::{
    DEFAULT_API_URL, DEFAULT_RAW_CONTENT_URL, GitHubContentClient, GitHubSettings,
    RemoteCredentials,
};
use crate::shared::infrastructure::local_cache::file::FileLocalCache;

/// Fundraiser project store backed by a git-hosted repository.
#[derive(Debug, Clone, Parser)]
#[command(name = "fundraiser_store", version, about)]
pub struct AppConfig {
    /// Repository owner (user or organization)
    #[arg(long, env = "FUNDRAISER_GITHUB_OWNER", default_value = "")]
    pub github_owner: String,

    /// Repository name
    #[arg(long, env = "FUNDRAISER_GITHUB_REPO", default_value = "")]
    pub github_repo: String,

    #[arg(long, env = "FUNDRAISER_GITHUB_BRANCH", default_value = "main")]
    pub github_branch: String,

    /// Access token with contents write permission; without it projects are only kept locally
    #[arg(
        long,
        env = "FUNDRAISER_GITHUB_TOKEN",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub github_token: String,

    #[arg(long, env = "FUNDRAISER_GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    #[arg(long, env = "FUNDRAISER_RAW_CONTENT_URL", default_value = DEFAULT_RAW_CONTENT_URL)]
    pub raw_content_url: String,

    #[arg(long, env = "FUNDRAISER_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Directory for the local fallback cache
    #[arg(long, env = "FUNDRAISER_CACHE_DIR", default_value = ".fundraiser-cache")]
    pub cache_dir: PathBuf,

    #[arg(long, env = "FUNDRAISER_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn credentials(&self) -> RemoteCredentials {
        RemoteCredentials::new(
            &self.github_owner,
            &self.github_repo,
            &self.github_branch,
            &self.github_token,
        )
    }

    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.github_api_url.clone(),
            raw_content_url: self.raw_content_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Build the session engine: remote when the credentials are complete, local otherwise.
    pub fn open_session(&self) -> Result<DocumentSyncEngine, reqwest::Error> {
        let cache = Arc::new(FileLocalCache::new(&self.cache_dir));
        let credentials = self.credentials();
        if !credentials.is_complete() {
            tracing::warn!(
                cache_dir = %self.cache_dir.display(),
                "repository credentials incomplete, projects are saved locally only"
            );
            return Ok(DocumentSyncEngine::local(cache));
        }
        tracing::info!(
            owner = %credentials.owner,
            repo = %credentials.repo,
            branch = %credentials.branch,
            "projects are saved to the repository"
        );
        let client = GitHubContentClient::new(credentials, self.github_settings())?;
        Ok(DocumentSyncEngine::remote(Arc::new(client), cache))
    }
}
