//! Tool descriptors for LLM tool-calling surfaces

use crate::types::{FetchRequest, OutputKind};
use schemars::schema_for;

/// One callable tool backed by a fixed [`OutputKind`]
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    /// Tool name as exposed to the caller
    pub name: &'static str,
    /// Output kind the tool produces
    pub kind: OutputKind,
    /// Description for LLM consumption
    pub description: &'static str,
}

impl ToolSpec {
    /// Input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }
}

const TOOLS: [ToolSpec; 4] = [
    ToolSpec {
        name: "fetch_html",
        kind: OutputKind::Html,
        description: "Fetch a website, save the raw HTML to a file, and return the file path",
    },
    ToolSpec {
        name: "fetch_json",
        kind: OutputKind::Json,
        description: "Fetch a JSON resource, save it pretty-printed to a file, and return the file path",
    },
    ToolSpec {
        name: "fetch_txt",
        kind: OutputKind::Text,
        description: "Fetch a website, save its visible text (no HTML) to a file, and return the file path",
    },
    ToolSpec {
        name: "fetch_markdown",
        kind: OutputKind::Markdown,
        description: "Fetch a website, save it converted to Markdown to a file, and return the file path",
    },
];

/// All tools, one per output kind
pub fn tools() -> &'static [ToolSpec] {
    &TOOLS
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}
