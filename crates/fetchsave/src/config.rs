//! Fetcher configuration

use crate::DEFAULT_USER_AGENT;
use std::path::PathBuf;
use std::time::Duration;

/// Total request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration shared by every fetch a [`Fetcher`](crate::Fetcher) performs
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Directory fetched files are written to
    pub download_dir: PathBuf,
    /// User-Agent sent unless the caller overrides it
    pub user_agent: String,
    /// Total request timeout
    pub timeout: Duration,
    /// Resolve domain names and block those pointing at private addresses
    pub resolve_hosts: bool,
    /// Disable the SSRF guard entirely (local development and tests only)
    pub allow_private_hosts: bool,
}

impl FetcherConfig {
    /// Create a configuration with defaults for everything but the directory
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            resolve_hosts: true,
            allow_private_hosts: false,
        }
    }
}
