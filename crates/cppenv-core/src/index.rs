//! Package index lookups (the PyPI JSON API).

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

/// Default package index; override with `CPPENV_INDEX_URL`.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// Per-request timeout for index lookups.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to query package index: {0}")]
    Http(#[from] reqwest::Error),

    #[error("package not found on index: {package} (status {status})")]
    NotFound { package: String, status: u16 },

    #[error("no version found for package: {0}")]
    MissingVersion(String),
}

#[derive(Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
}

#[derive(Deserialize)]
struct ProjectInfo {
    #[serde(default)]
    version: Option<String>,
}

/// HTTP client configured for index lookups.
pub fn client() -> Result<Client, IndexError> {
    Ok(Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Latest released version of `package` according to the index at `index_url`.
pub async fn latest_version(
    client: &Client,
    index_url: &str,
    package: &str,
) -> Result<String, IndexError> {
    let url = format!("{}/pypi/{package}/json", index_url.trim_end_matches('/'));
    tracing::debug!(%url, "querying package index");

    let response = client.get(&url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(IndexError::NotFound {
            package: package.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body: ProjectResponse = response.json().await?;
    body.info
        .version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| IndexError::MissingVersion(package.to_string()))
}
