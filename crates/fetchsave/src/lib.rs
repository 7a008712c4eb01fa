//! fetchsave - fetch web content to disk, return only a file path
//!
//! Fetched resources are converted (HTML passthrough, pretty JSON, visible
//! text, or Markdown), written to a configured download directory, and
//! reported back as a file path plus content type. Callers such as LLM agents
//! keep bulky payloads out of their context and read the file when needed.
//!
//! ## Pipeline
//!
//! [`Fetcher`] runs each request through:
//! 1. URL validation
//! 2. Download directory creation
//! 3. SSRF guard ([`guard`])
//! 4. HTTP GET through an [`HttpTransport`]
//! 5. Conversion by the kind's [`Transformer`]
//! 6. Filename generation ([`filename`])
//! 7. Persistence
//!
//! Every failure is returned as an error-shaped [`FetchResult`].

pub mod client;
pub mod config;
mod convert;
mod error;
mod fetcher;
pub mod filename;
pub mod guard;
pub mod storage;
mod tool;
pub mod transform;
mod types;

pub use client::{HttpResponse, HttpTransport, ReqwestTransport};
pub use config::FetcherConfig;
pub use convert::{html_to_markdown, html_to_text};
pub use error::{FetchError, StageError, TransformError, TransportError};
pub use fetcher::{Fetcher, FetcherBuilder};
pub use guard::{is_blocked, HostResolver, SystemResolver};
pub use tool::{find_tool, tools, ToolSpec};
pub use transform::{transform, Transformed, Transformer};
pub use types::{FetchRequest, FetchResult, OutputKind, ResultContent, SavedFile};

/// Default User-Agent string, a current desktop browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# fetchsave

Fetches a URL, saves the (optionally converted) content to a file, and returns
the file path and content type. The content itself is never returned.

## Tools
- `fetch_html`: raw HTML, saved as `.html` (text/html)
- `fetch_json`: JSON pretty-printed with 2-space indentation, saved as `.json` (application/json)
- `fetch_txt`: visible text of an HTML page, scripts and styles removed, saved as `.txt` (text/plain)
- `fetch_markdown`: HTML converted to Markdown, saved as `.md` (text/markdown)

## Input Parameters
- `url` (required): absolute http:// or https:// URL
- `headers` (optional): object of extra request headers; overrides defaults such as User-Agent

## Output
On success, two text segments:
```
File saved to: /abs/path/20231027T103000Z-a1b2c3d4-page.html
Content-Type: text/html
```
On failure, one text segment with the error and `isError: true`.

## File Names
`<YYYYMMDDTHHMMSS>Z-<8 hex chars>-<basename>.<ext>`; the basename is the last
URL path segment (or the host name) with characters outside `[A-Za-z0-9_-]`
replaced by `_`, at most 50 characters.

## Error Handling
- Malformed URLs: `Invalid URL format: ...`
- Private, loopback and link-local targets are refused: `Failed to fetch <url>: Fetcher blocked an attempt to fetch a private IP <url>. ...`
- Non-success status: `Failed to fetch <url>: HTTP error: <status>`
- Other failures: `Failed to fetch <url>: <message>`
"#;
