/// Idempotent fetch-and-store collaborator used by the installation phase
use anyhow::{Context, Result};
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::path::Path;

/// Download `url` into `dest`, skipping the transfer when the destination
/// already exists (and, when a checksum is given, still matches it).
///
/// No retry or backoff here; transient-failure policy belongs to the caller.
pub async fn fetch_and_store(
    client: &Client,
    url: &str,
    dest: &Path,
    expected_sha1: Option<&str>,
) -> Result<()> {
    if dest.exists() {
        match expected_sha1 {
            Some(expected) if !matches_sha1(dest, expected).await? => {
                log::warn!("existing file fails checksum, refetching: {:?}", dest);
            }
            _ => {
                log::debug!("destination exists, skipping fetch: {:?}", dest);
                return Ok(());
            }
        }
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .context("failed to create destination directory")?;
    }

    log::debug!("fetching: {} -> {:?}", url, dest);
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed: {}", url))?
        .error_for_status()
        .with_context(|| format!("server rejected request: {}", url))?;

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("failed to read response body: {}", url))?;

    if let Some(expected) = expected_sha1 {
        let computed = sha1_hex(&bytes);
        anyhow::ensure!(
            computed.eq_ignore_ascii_case(expected),
            "checksum mismatch for {}: {} != {}",
            url,
            computed,
            expected
        );
    }

    tokio::fs::write(dest, &bytes)
        .await
        .with_context(|| format!("failed to write {:?}", dest))?;

    Ok(())
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

async fn matches_sha1(path: &Path, expected: &str) -> Result<bool> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {:?}", path))?;
    Ok(sha1_hex(&bytes).eq_ignore_ascii_case(expected))
}
