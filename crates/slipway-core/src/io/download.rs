//! Streaming download with on-the-fly content hashing.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use sha1::{Digest, Sha1};
use slipway_schema::hash::Sha1Hash;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Failure while streaming a remote object to disk.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure (connection, status, or body stream).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem failure while writing the destination file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream `url` into `dest`, hashing the bytes as they arrive.
///
/// Returns the SHA-1 of everything written; the caller decides what a
/// mismatch against the published signature means.
///
/// # Errors
///
/// Any transport or filesystem failure aborts the download; a partial
/// `dest` file may remain and the caller owns its cleanup (downloads are
/// staged in temporary directories).
pub async fn download_to_path(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<Sha1Hash, DownloadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha1::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;

    tracing::debug!(url, bytes = downloaded, "downloaded artifact");

    Ok(Sha1Hash::new(hex::encode(hasher.finalize())))
}
