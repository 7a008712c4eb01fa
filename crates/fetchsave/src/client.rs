//! HTTP transport for fetchsave
//!
//! The orchestrator talks to the network only through [`HttpTransport`].
//! [`ReqwestTransport`] is the production implementation. Transports never
//! follow redirects themselves; the orchestrator follows them hop by hop so
//! every target passes the SSRF guard before it is requested.

use crate::error::{FetchError, StageError, TransportError};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, COOKIE, LOCATION,
    PROXY_AUTHORIZATION, USER_AGENT,
};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum redirects followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Response returned by a transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status of the response
    pub status: StatusCode,
    /// Raw `Location` header, if any
    pub location: Option<String>,
    /// Body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Next hop when this is a redirect with a usable `Location`
    pub fn redirect_target(&self, base: &Url) -> Option<Url> {
        if !self.status.is_redirection() {
            return None;
        }
        let location = self.location.as_deref()?;
        base.join(location).ok()
    }
}

/// Capability to perform a single HTTP GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with exactly the given headers, without following redirects
    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given total request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(FetchError::ClientBuildError)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(TransportError::from_reqwest)?;

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

/// Default headers sent with every request
pub fn default_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(crate::DEFAULT_USER_AGENT)),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Drop credentials before following a redirect to another origin
pub fn strip_credentials(headers: &mut HeaderMap) {
    for name in [AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION] {
        headers.remove(name);
    }
}

/// Overlay caller headers on the defaults; caller values win
///
/// Header names compare case-insensitively.
pub fn merge_headers(
    mut headers: HeaderMap,
    custom: Option<&HashMap<String, String>>,
) -> Result<HeaderMap, StageError> {
    for (name, value) in custom.into_iter().flatten() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| StageError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| StageError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = default_headers("TestAgent/1.0");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "TestAgent/1.0");
        assert!(headers.contains_key(ACCEPT));
    }

    #[test]
    fn test_default_headers_invalid_user_agent() {
        let headers = default_headers("bad\nagent");
        assert_eq!(headers.get(USER_AGENT).unwrap(), crate::DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let mut custom = HashMap::new();
        custom.insert("user-agent".to_string(), "Custom/2.0".to_string());
        custom.insert("X-Api-Key".to_string(), "secret".to_string());

        let merged = merge_headers(default_headers("Default/1.0"), Some(&custom)).unwrap();
        assert_eq!(merged.get(USER_AGENT).unwrap(), "Custom/2.0");
        assert_eq!(merged.get("x-api-key").unwrap(), "secret");
        assert_eq!(merged.get_all(USER_AGENT).iter().count(), 1);
    }

    #[test]
    fn test_merge_headers_none() {
        let merged = merge_headers(default_headers("Default/1.0"), None).unwrap();
        assert_eq!(merged, default_headers("Default/1.0"));
    }

    #[test]
    fn test_merge_headers_invalid() {
        let mut custom = HashMap::new();
        custom.insert("bad header".to_string(), "x".to_string());
        let err = merge_headers(HeaderMap::new(), Some(&custom)).unwrap_err();
        assert!(err.to_string().starts_with("Invalid header bad header: "));

        let mut custom = HashMap::new();
        custom.insert("X-Ok".to_string(), "line\nbreak".to_string());
        assert!(matches!(
            merge_headers(HeaderMap::new(), Some(&custom)),
            Err(StageError::InvalidHeader { .. })
        ));
    }

    fn response(status: u16, location: Option<&str>) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            location: location.map(str::to_string),
            body: String::new(),
        }
    }

    #[test]
    fn test_redirect_target() {
        let base = Url::parse("https://example.com/a/b").unwrap();

        let next = response(302, Some("../c")).redirect_target(&base).unwrap();
        assert_eq!(next.as_str(), "https://example.com/c");

        let next = response(301, Some("https://other.example.org/x"))
            .redirect_target(&base)
            .unwrap();
        assert_eq!(next.as_str(), "https://other.example.org/x");

        assert!(response(302, None).redirect_target(&base).is_none());
        assert!(response(200, Some("/elsewhere")).redirect_target(&base).is_none());
    }

    #[test]
    fn test_strip_credentials() {
        let mut headers = default_headers("Agent/1.0");
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(COOKIE, HeaderValue::from_static("session=1"));
        strip_credentials(&mut headers);
        assert!(!headers.contains_key(AUTHORIZATION));
        assert!(!headers.contains_key(COOKIE));
        assert_eq!(headers.get(USER_AGENT).unwrap(), "Agent/1.0");
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
