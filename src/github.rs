use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client, Response, StatusCode};
use tracing::debug;

use crate::{
    config::Config,
    error::{ProxyError, Result},
    source::{ByteStream, ContentSource},
    types::FileListing,
};

/// Password paired with the token for GitHub basic auth
const OAUTH_BASIC_PASSWORD: &str = "x-oauth-basic";

const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// GitHub-backed content source
///
/// Fetches the listing from the GitHub contents API and the file bodies
/// from whatever `download_url` each entry points at (usually
/// raw.githubusercontent.com).
#[derive(Clone)]
pub struct GitHubSource {
    client: Client,
    listing_url: String,
    token: Option<String>,
}

impl GitHubSource {
    /// Create a source with its own client, honouring the configured timeout
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ghproxy/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self::with_client(
            client,
            config.listing_url.clone(),
            config.token.clone(),
        ))
    }

    /// Create a source around an existing client
    ///
    /// # Arguments
    /// * `client` - HTTP client shared by every request
    /// * `listing_url` - Contents API url returning a JSON array of entries
    /// * `token` - Optional token sent as the basic auth username
    pub fn with_client(client: Client, listing_url: String, token: Option<String>) -> Self {
        Self {
            client,
            listing_url,
            token,
        }
    }

    /// Check if an error is a rate limit error
    fn is_rate_limit_error(&self, status: StatusCode) -> bool {
        status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Turn a non-success response into the matching error
    async fn status_error(&self, url: &str, response: Response) -> ProxyError {
        let status = response.status();
        if self.is_rate_limit_error(status) {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "GitHub API rate limit exceeded".to_string());
            return ProxyError::RateLimited { message };
        }

        ProxyError::UpstreamStatus {
            url: url.to_string(),
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ContentSource for GitHubSource {
    async fn list_files(&self) -> Result<FileListing> {
        let mut request = self
            .client
            .get(&self.listing_url)
            .header(header::ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.token {
            request = request.basic_auth(token, Some(OAUTH_BASIC_PASSWORD));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(self.status_error(&self.listing_url, response).await);
        }

        let body = response.bytes().await?;
        let listing: FileListing = serde_json::from_slice(&body)?;
        debug!(entries = listing.len(), url = %self.listing_url, "fetched listing");
        Ok(listing)
    }

    async fn open_file(&self, download_url: &str) -> Result<ByteStream> {
        if download_url.is_empty() {
            return Err(ProxyError::MissingIndex);
        }

        let response = self.client.get(download_url).send().await?;
        if !response.status().is_success() {
            return Err(self.status_error(download_url, response).await);
        }

        Ok(response.bytes_stream().map_err(ProxyError::from).boxed())
    }

    fn identifier(&self) -> String {
        format!("github+{}", self.listing_url)
    }
}
