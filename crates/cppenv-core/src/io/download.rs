//! Streaming HTTP downloads with progress reporting.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download `url` into `dest`, returning the number of bytes written.
///
/// Anything other than `200 OK` is an error; nothing is written in that case.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    label: &str,
    reporter: &dyn Reporter,
) -> Result<u64, DownloadError> {
    tracing::debug!(url, dest = %dest.display(), "downloading");

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total_size = response.content_length();
    reporter.downloading(label, 0, total_size);

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        reporter.downloading(label, downloaded, total_size);
    }

    file.flush().await?;
    tracing::debug!(bytes = downloaded, "download complete");

    Ok(downloaded)
}
