//! Content transformers
//!
//! Each [`OutputKind`] maps to one [`Transformer`] that turns a raw response
//! body into the text to persist.

use crate::convert::{html_to_markdown, html_to_text};
use crate::error::TransformError;
use crate::types::OutputKind;

/// Content ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub content: String,
    pub content_type: &'static str,
}

/// Converts a raw response body into one output format
pub trait Transformer: Send + Sync {
    /// Output kind this transformer produces
    fn kind(&self) -> OutputKind;

    /// Convert the response body
    fn convert(&self, body: &str) -> Result<String, TransformError>;

    /// Convert the body and attach the canonical content type
    fn transform(&self, body: &str) -> Result<Transformed, TransformError> {
        Ok(Transformed {
            content: self.convert(body)?,
            content_type: self.kind().content_type(),
        })
    }
}

/// Passes HTML through unmodified
pub struct HtmlTransformer;

impl Transformer for HtmlTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Html
    }

    fn convert(&self, body: &str) -> Result<String, TransformError> {
        Ok(body.to_string())
    }
}

/// Parses JSON and pretty-prints it with 2-space indentation
pub struct JsonTransformer;

impl Transformer for JsonTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Json
    }

    fn convert(&self, body: &str) -> Result<String, TransformError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// Extracts visible text from HTML
pub struct TextTransformer;

impl Transformer for TextTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Text
    }

    fn convert(&self, body: &str) -> Result<String, TransformError> {
        Ok(html_to_text(body))
    }
}

/// Converts HTML to Markdown
pub struct MarkdownTransformer;

impl Transformer for MarkdownTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Markdown
    }

    fn convert(&self, body: &str) -> Result<String, TransformError> {
        html_to_markdown(body)
    }
}

impl OutputKind {
    /// Transformer producing this kind
    pub fn transformer(self) -> &'static dyn Transformer {
        match self {
            OutputKind::Html => &HtmlTransformer,
            OutputKind::Json => &JsonTransformer,
            OutputKind::Text => &TextTransformer,
            OutputKind::Markdown => &MarkdownTransformer,
        }
    }
}

/// Transform a response body into the given output kind
pub fn transform(body: &str, kind: OutputKind) -> Result<Transformed, TransformError> {
    kind.transformer().transform(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><style>p{}</style></head>\
        <body><h1>Hello</h1><p>World <em>wide</em></p><script>track()</script></body></html>";

    #[test]
    fn test_transformer_kinds_match() {
        for kind in OutputKind::ALL {
            assert_eq!(kind.transformer().kind(), kind);
        }
    }

    #[test]
    fn test_html_passthrough() {
        let out = transform(PAGE, OutputKind::Html).unwrap();
        assert_eq!(out.content, PAGE);
        assert_eq!(out.content_type, "text/html");
    }

    #[test]
    fn test_json_pretty_printed() {
        let out = transform(r#"{"b":1,"a":[true,null]}"#, OutputKind::Json).unwrap();
        assert_eq!(
            out.content,
            "{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}"
        );
        assert_eq!(out.content_type, "application/json");
    }

    #[test]
    fn test_json_invalid() {
        let err = transform("<html>not json</html>", OutputKind::Json).unwrap_err();
        assert!(matches!(err, TransformError::Json(_)));
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_text_extraction() {
        let out = transform(PAGE, OutputKind::Text).unwrap();
        assert_eq!(out.content, "Hello World wide");
        assert_eq!(out.content_type, "text/plain");
    }

    #[test]
    fn test_markdown_conversion() {
        let out = transform(PAGE, OutputKind::Markdown).unwrap();
        assert!(out.content.contains("# Hello"));
        assert!(out.content.contains("*wide*") || out.content.contains("_wide_"));
        assert!(!out.content.contains("track()"));
        assert_eq!(out.content_type, "text/markdown");
    }
}
