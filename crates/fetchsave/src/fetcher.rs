//! Fetch orchestrator
//!
//! Runs one request through the pipeline: validate, prepare the download
//! directory, guard, GET (following redirects, guarding every hop),
//! transform, name, write. Every failure becomes an
//! error-shaped [`FetchResult`]; nothing escapes the public operations.

use crate::client::{
    default_headers, merge_headers, strip_credentials, HttpTransport, ReqwestTransport,
    MAX_REDIRECTS,
};
use crate::config::FetcherConfig;
use crate::error::{FetchError, StageError, TransportError};
use crate::guard::{is_blocked_url, resolves_to_private, HostResolver, SystemResolver};
use crate::types::{FetchRequest, FetchResult, OutputKind, SavedFile};
use crate::{filename, storage, transform};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Builder for configuring a [`Fetcher`]
pub struct FetcherBuilder {
    config: FetcherConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    resolver: Option<Arc<dyn HostResolver>>,
}

impl FetcherBuilder {
    /// Start from defaults for the given download directory
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(FetcherConfig::new(download_dir))
    }

    /// Start from an existing configuration
    pub fn from_config(config: FetcherConfig) -> Self {
        Self {
            config,
            transport: None,
            resolver: None,
        }
    }

    /// Set the default User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set the total request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable or disable DNS-aware SSRF checks
    pub fn resolve_hosts(mut self, enable: bool) -> Self {
        self.config.resolve_hosts = enable;
        self
    }

    /// Allow fetching private and internal hosts
    pub fn allow_private_hosts(mut self, allow: bool) -> Self {
        self.config.allow_private_hosts = allow;
        self
    }

    /// Use a custom HTTP transport
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom host resolver
    pub fn resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the fetcher
    ///
    /// A relative download directory is resolved against the current
    /// directory so saved paths are always absolute.
    pub fn build(mut self) -> Result<Fetcher, FetchError> {
        self.config.download_dir =
            std::path::absolute(&self.config.download_dir).map_err(FetchError::CreateDirectory)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.timeout)?),
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(SystemResolver));

        Ok(Fetcher {
            config: self.config,
            transport,
            resolver,
        })
    }
}

/// Fetches URLs and persists the converted content to the download directory
///
/// Cheap to share: hold it in an `Arc` and call it from concurrent tasks.
pub struct Fetcher {
    config: FetcherConfig,
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<dyn HostResolver>,
}

impl Fetcher {
    /// Create a fetcher with default settings
    pub fn new(download_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        FetcherBuilder::new(download_dir).build()
    }

    /// Create a fetcher builder
    pub fn builder(download_dir: impl Into<PathBuf>) -> FetcherBuilder {
        FetcherBuilder::new(download_dir)
    }

    /// Active configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch and save raw HTML
    pub async fn fetch_html(&self, request: &FetchRequest) -> FetchResult {
        self.fetch(request, OutputKind::Html).await
    }

    /// Fetch and save pretty-printed JSON
    pub async fn fetch_json(&self, request: &FetchRequest) -> FetchResult {
        self.fetch(request, OutputKind::Json).await
    }

    /// Fetch HTML and save its visible text
    pub async fn fetch_text(&self, request: &FetchRequest) -> FetchResult {
        self.fetch(request, OutputKind::Text).await
    }

    /// Fetch HTML and save it as Markdown
    pub async fn fetch_markdown(&self, request: &FetchRequest) -> FetchResult {
        self.fetch(request, OutputKind::Markdown).await
    }

    /// Fetch `request` as `kind`, returning the uniform result shape
    pub async fn fetch(&self, request: &FetchRequest, kind: OutputKind) -> FetchResult {
        let result = self.try_fetch(request, kind).await;
        if let Err(ref e) = result {
            warn!(url = %request.url, %kind, error = %e, "Fetch failed");
        }
        FetchResult::from(result)
    }

    /// Fetch `request` as `kind`, returning a typed error on failure
    pub async fn try_fetch(
        &self,
        request: &FetchRequest,
        kind: OutputKind,
    ) -> Result<SavedFile, FetchError> {
        let url = parse_url(&request.url)?;

        storage::ensure_directory(&self.config.download_dir)
            .await
            .map_err(FetchError::CreateDirectory)?;

        self.run_stages(request, &url, kind)
            .await
            .map_err(|e| FetchError::stage(&request.url, e))
    }

    async fn run_stages(
        &self,
        request: &FetchRequest,
        url: &Url,
        kind: OutputKind,
    ) -> Result<SavedFile, StageError> {
        self.guard(&request.url, url).await?;

        let mut headers = merge_headers(
            default_headers(&self.config.user_agent),
            request.headers.as_ref(),
        )?;

        let mut current = url.clone();
        let mut redirects = 0;
        let response = loop {
            debug!(url = %current, %kind, "Sending request");
            let response = self.transport.get(&current, headers.clone()).await?;

            let Some(next) = response.redirect_target(&current) else {
                break response;
            };
            if redirects == MAX_REDIRECTS {
                return Err(StageError::TooManyRedirects(MAX_REDIRECTS));
            }
            redirects += 1;

            if !matches!(next.scheme(), "http" | "https") {
                return Err(TransportError::Request(format!(
                    "redirect to unsupported scheme '{}'",
                    next.scheme()
                ))
                .into());
            }

            debug!(from = %current, to = %next, "Following redirect");
            self.guard(next.as_str(), &next).await?;
            if next.origin() != current.origin() {
                strip_credentials(&mut headers);
            }
            current = next;
        };

        if !response.status.is_success() {
            return Err(StageError::HttpStatus(response.status.as_u16()));
        }

        let transformed = transform::transform(&response.body, kind)?;

        let name = filename::generate(&request.url, kind.extension());
        let path = self.config.download_dir.join(name);
        debug!(path = %path.display(), "Writing file");
        storage::write_file(&path, &transformed.content)
            .await
            .map_err(StageError::Write)?;

        info!(url = %request.url, path = %path.display(), %kind, "Saved fetched content");
        Ok(SavedFile {
            path,
            content_type: transformed.content_type,
        })
    }

    /// Refuse `url` when it names or resolves to a private address
    ///
    /// `shown` is the URL as it appears in the error message.
    async fn guard(&self, shown: &str, url: &Url) -> Result<(), StageError> {
        if self.config.allow_private_hosts {
            return Ok(());
        }

        let blocked = is_blocked_url(url)
            || (self.config.resolve_hosts && resolves_to_private(url, self.resolver.as_ref()).await);

        if blocked {
            warn!(url = %shown, "Blocked private address");
            return Err(StageError::PrivateIp(shown.to_string()));
        }
        Ok(())
    }
}

/// Validate that `raw` is an absolute http(s) URL with a host
fn parse_url(raw: &str) -> Result<Url, FetchError> {
    if raw.trim().is_empty() {
        return Err(FetchError::InvalidUrl("URL is empty".to_string()));
    }

    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{}', must be http or https",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(FetchError::InvalidUrl("URL has no host".to_string()));
    }

    Ok(url)
}
