//! Generator utility functions
//!
//! This module provides common utility functions used by the generator,
//! including path expansion and bounded source retrieval.

use std::time::Duration;

use tracing::debug;

use crate::get_version;

// ============================================================================
// Path Utilities
// ============================================================================

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Some(home) = dirs_home()
    {
        return path.replacen("~", &home, 1);
    }
    path.to_string()
}

/// Get home directory path
pub fn dirs_home() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok()
    }
}

/// Returns `true` for http(s) URLs.
pub fn is_remote(path_or_url: &str) -> bool {
    path_or_url.starts_with("http://") || path_or_url.starts_with("https://")
}

/// Default HTTP user agent.
pub fn default_user_agent() -> String {
    format!("stashgen/{}", get_version())
}

// ============================================================================
// Source Retrieval
// ============================================================================

/// Failure to obtain the source text. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed with status {status}: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("timed out after {}s fetching {url}", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode content of {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
}

/// Fetch text content from a URL, giving up after `timeout`.
pub async fn fetch_text(
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    debug!("Fetching URL: {}", url);

    let http_err = |source| FetchError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(http_err)?;

    let request = async {
        let response = client.get(url).send().await.map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(http_err)
    };

    let text = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
            timeout,
        })??;

    debug!("Received {} bytes from {}", text.len(), url);
    Ok(text)
}

/// Reads a local source file (with `~` expansion).
pub async fn read_text(path: &str) -> Result<String, FetchError> {
    let expanded = expand_tilde(path);
    tokio::fs::read_to_string(&expanded)
        .await
        .map_err(|source| FetchError::Io {
            path: expanded,
            source,
        })
}

/// Fetches `source` if it is a URL, otherwise reads it from disk.
pub async fn load_text(
    source: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    if is_remote(source) {
        fetch_text(source, user_agent, timeout).await
    } else {
        read_text(source).await
    }
}
