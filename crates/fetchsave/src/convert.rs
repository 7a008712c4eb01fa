//! HTML conversion utilities

use crate::error::TransformError;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use htmd::options::{CodeBlockStyle, HeadingStyle, LinkStyle, Options};
use htmd::HtmlToMarkdown;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements whose content is never visible text
const SKIP_TAGS: &[&str] = &["script", "style"];

/// Convert HTML to Markdown
///
/// ATX headings, fenced code blocks and inline links.
pub fn html_to_markdown(html: &str) -> Result<String, TransformError> {
    let options = Options {
        heading_style: HeadingStyle::Atx,
        code_block_style: CodeBlockStyle::Fenced,
        link_style: LinkStyle::Inlined,
        ..Default::default()
    };
    let converter = HtmlToMarkdown::builder()
        .options(options)
        .skip_tags(SKIP_TAGS.to_vec())
        .build();
    converter
        .convert(html)
        .map_err(|e| TransformError::Html(e.to_string()))
}

/// Extract the visible text of an HTML document
///
/// Parses `html` into a DOM, walks the `<body>` and joins its text nodes,
/// skipping `<script>`, `<style>`, `<noscript>` and `<template>` subtrees.
/// Block elements separate words; every whitespace run collapses to a single
/// space.
pub fn html_to_text(html: &str) -> String {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let mut output = String::new();
    if let Some(body) = find_element(&dom.document, "body") {
        collect_text(&body, &mut output);
    }
    collapse_whitespace(&output)
}

/// Elements whose subtree contributes no visible text
const TEXT_SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

enum Step {
    Visit(Handle),
    Separate,
}

fn element_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn find_element(root: &Handle, tag: &str) -> Option<Handle> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if element_name(&node) == Some(tag) {
            return Some(node);
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}

// Iterative: nesting depth is attacker-controlled
fn collect_text(root: &Handle, output: &mut String) {
    let mut stack = vec![Step::Visit(root.clone())];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Visit(node) => node,
            Step::Separate => {
                output.push(' ');
                continue;
            }
        };

        match &node.data {
            NodeData::Text { contents } => output.push_str(&contents.borrow()),
            NodeData::Element { name, .. } => {
                let tag = &*name.local;
                if TEXT_SKIP_TAGS.contains(&tag) {
                    continue;
                }
                // Tags separate words, e.g. "<p>a</p><p>b</p>"
                if is_block_tag(tag) {
                    output.push(' ');
                    stack.push(Step::Separate);
                }
                stack.extend(node.children.borrow().iter().rev().cloned().map(Step::Visit));
            }
            _ => {}
        }
    }
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "br"
            | "hr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "ul"
            | "ol"
            | "dl"
            | "dt"
            | "dd"
            | "tr"
            | "td"
            | "th"
            | "table"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "main"
            | "nav"
            | "aside"
            | "blockquote"
            | "pre"
            | "figure"
            | "figcaption"
    )
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
