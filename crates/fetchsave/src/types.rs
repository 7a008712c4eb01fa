//! Core types for fetchsave

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format the fetched body is persisted as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Raw HTML, passed through unmodified
    Html,
    /// JSON, re-serialized with 2-space indentation
    Json,
    /// Visible text extracted from HTML
    Text,
    /// HTML converted to Markdown
    Markdown,
}

impl OutputKind {
    /// Every kind, in tool registration order
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Html,
        OutputKind::Json,
        OutputKind::Text,
        OutputKind::Markdown,
    ];

    /// File extension used for persisted files
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Html => "html",
            OutputKind::Json => "json",
            OutputKind::Text => "txt",
            OutputKind::Markdown => "md",
        }
    }

    /// Canonical content type reported back to the caller
    pub fn content_type(self) -> &'static str {
        match self {
            OutputKind::Html => "text/html",
            OutputKind::Json => "application/json",
            OutputKind::Text => "text/plain",
            OutputKind::Markdown => "text/markdown",
        }
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputKind::Html),
            "json" => Ok(OutputKind::Json),
            "text" | "txt" => Ok(OutputKind::Text),
            "markdown" | "md" => Ok(OutputKind::Markdown),
            _ => Err("Invalid output kind: must be html, json, text or markdown".to_string()),
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Html => write!(f, "html"),
            OutputKind::Json => write!(f, "json"),
            OutputKind::Text => write!(f, "text"),
            OutputKind::Markdown => write!(f, "markdown"),
        }
    }
}

/// Request to fetch a URL and persist the result
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchRequest {
    /// URL of the resource to fetch (required, absolute http:// or https:// URL)
    pub url: String,

    /// Optional headers to include in the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a custom header, overriding any default with the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// A file written by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Absolute path of the persisted file
    pub path: PathBuf,
    /// Canonical content type of the persisted content
    pub content_type: &'static str,
}

/// One segment of a [`FetchResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultContent {
    /// Plain text segment
    Text {
        /// Segment text
        text: String,
    },
}

impl ResultContent {
    /// Create a text segment
    pub fn text(text: impl Into<String>) -> Self {
        ResultContent::Text { text: text.into() }
    }

    /// The segment text
    pub fn as_text(&self) -> &str {
        match self {
            ResultContent::Text { text } => text,
        }
    }
}

/// Uniform result of every fetch operation
///
/// Success carries two segments (file path, then content type); failure
/// carries one segment with the error message. Content is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchResult {
    /// Ordered result segments
    pub content: Vec<ResultContent>,

    /// True when the fetch failed
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl FetchResult {
    /// Build the success result for a saved file
    pub fn saved(file: &SavedFile) -> Self {
        Self {
            content: vec![
                ResultContent::text(format!("File saved to: {}", file.path.display())),
                ResultContent::text(format!("Content-Type: {}", file.content_type)),
            ],
            is_error: false,
        }
    }

    /// Build an error result carrying a single message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ResultContent::text(message)],
            is_error: true,
        }
    }

    /// All segment texts joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ResultContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Result<SavedFile, crate::FetchError>> for FetchResult {
    fn from(result: Result<SavedFile, crate::FetchError>) -> Self {
        match result {
            Ok(file) => FetchResult::saved(&file),
            Err(err) => FetchResult::error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_from_str() {
        assert_eq!(OutputKind::from_str("HTML").unwrap(), OutputKind::Html);
        assert_eq!(OutputKind::from_str("json").unwrap(), OutputKind::Json);
        assert_eq!(OutputKind::from_str("txt").unwrap(), OutputKind::Text);
        assert_eq!(OutputKind::from_str("Text").unwrap(), OutputKind::Text);
        assert_eq!(OutputKind::from_str("md").unwrap(), OutputKind::Markdown);
        assert!(OutputKind::from_str("pdf").is_err());
    }

    #[test]
    fn test_output_kind_metadata() {
        let table: Vec<_> = OutputKind::ALL
            .iter()
            .map(|k| (k.extension(), k.content_type()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("html", "text/html"),
                ("json", "application/json"),
                ("txt", "text/plain"),
                ("md", "text/markdown"),
            ]
        );
    }

    #[test]
    fn test_request_builder() {
        let req = FetchRequest::new("https://example.com").header("X-Api-Key", "secret");
        assert_eq!(req.url, "https://example.com");
        assert_eq!(
            req.headers.unwrap().get("X-Api-Key"),
            Some(&"secret".to_string())
        );
    }

    #[test]
    fn test_request_deserialize_without_headers() {
        let req: FetchRequest = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert_eq!(req.url, "https://example.com");
        assert!(req.headers.is_none());
    }

    #[test]
    fn test_saved_result_segments() {
        let result = FetchResult::saved(&SavedFile {
            path: PathBuf::from("/tmp/downloads/x.md"),
            content_type: "text/markdown",
        });
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 2);
        assert_eq!(
            result.content[0].as_text(),
            "File saved to: /tmp/downloads/x.md"
        );
        assert_eq!(result.content[1].as_text(), "Content-Type: text/markdown");
    }

    #[test]
    fn test_result_serialization() {
        let result = FetchResult::error("HTTP error: 500");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{"type": "text", "text": "HTTP error: 500"}],
                "isError": true
            })
        );
    }
}
