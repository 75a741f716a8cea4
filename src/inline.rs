//! Inline content formatting.
//!
//! Inline nodes (text, emphasis, code spans, links) are rendered in one of
//! two ways:
//!
//! - [`structured`] produces styled rich text elements, for headings' text,
//!   list items and quotes.
//! - [`flatten`] produces a single Slack `mrkdwn` string, for sections that
//!   only accept encoded text:
//!   - Bold: `*text*`
//!   - Italic: `_text_`
//!   - Code: `` `text` ``
//!   - Link: `<url|text>`
//!
//!   `&`, `<` and `>` in text are escaped as Slack requires.

use crate::block::{InlineElement, Style, TextRun};
use crate::config::EmphasisPolicy;
use crate::syntax::{Node, NodeKind};

/// Render the inline content below `node` as styled elements.
///
/// Adjacent unstyled text fragments are merged into a single run.
pub fn structured(node: &Node) -> Vec<InlineElement> {
    merge_plain(runs(node, Style::PLAIN))
}

fn runs(node: &Node, style: Style) -> Vec<InlineElement> {
    match &node.kind {
        NodeKind::Text { value, .. } => vec![TextRun::styled(value.as_str(), style).into()],
        NodeKind::Emphasis { level } => {
            let inner = style.with_emphasis(*level);
            node.children
                .iter()
                .flat_map(|child| runs(child, inner))
                .collect()
        }
        // Code never carries bold or italic.
        NodeKind::CodeSpan { code } => vec![TextRun::code(code.as_str()).into()],
        NodeKind::Link { destination } => vec![InlineElement::Link {
            url: destination.clone(),
            text: node.literal_text(),
        }],
        _ => node
            .children
            .iter()
            .flat_map(|child| runs(child, style))
            .collect(),
    }
}

/// Merge every pair of neighbouring unstyled text runs.
pub fn merge_plain(elements: Vec<InlineElement>) -> Vec<InlineElement> {
    let mut merged: Vec<InlineElement> = Vec::with_capacity(elements.len());
    for element in elements {
        match (merged.last_mut(), element) {
            (Some(InlineElement::Text(last)), InlineElement::Text(run))
                if last.style.is_plain() && run.style.is_plain() =>
            {
                last.text.push_str(&run.text);
            }
            (_, element) => merged.push(element),
        }
    }
    merged
}

/// Render the inline content below `node` as one mrkdwn string.
pub fn flatten(node: &Node, policy: EmphasisPolicy) -> String {
    match policy {
        EmphasisPolicy::FirstText => flatten_first_text(node),
        EmphasisPolicy::Nested => flatten_nested(node),
    }
}

fn delimiter(level: u8) -> Option<char> {
    match level {
        2 => Some('*'),
        1 => Some('_'),
        _ => None,
    }
}

/// Single pending-emphasis flag: an emphasis node arms it, the next text
/// node consumes it.
fn flatten_first_text(node: &Node) -> String {
    let mut nodes = Vec::new();
    preorder(node, &mut nodes);

    let mut out = String::new();
    let mut pending: Option<char> = None;
    for node in nodes {
        match &node.kind {
            NodeKind::Emphasis { level } => pending = delimiter(*level),
            NodeKind::Text { value, .. } => match pending.take() {
                Some(mark) => {
                    out.push(mark);
                    push_escaped(&mut out, value);
                    out.push(mark);
                }
                None => push_escaped(&mut out, value),
            },
            NodeKind::CodeSpan { code } => push_code(&mut out, code),
            NodeKind::Link { destination } => push_link(&mut out, destination, node),
            _ => {}
        }
    }
    out
}

/// Nodes in document order. Link labels are not descended into.
fn preorder<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    out.push(node);
    if matches!(node.kind, NodeKind::Link { .. }) {
        return;
    }
    for child in &node.children {
        preorder(child, out);
    }
}

fn flatten_nested(node: &Node) -> String {
    match &node.kind {
        NodeKind::Text { value, .. } => {
            let mut out = String::new();
            push_escaped(&mut out, value);
            out
        }
        NodeKind::CodeSpan { code } => {
            let mut out = String::new();
            push_code(&mut out, code);
            out
        }
        NodeKind::Link { destination } => {
            let mut out = String::new();
            push_link(&mut out, destination, node);
            out
        }
        NodeKind::Emphasis { level } => {
            let inner: String = node.children.iter().map(flatten_nested).collect();
            match delimiter(*level) {
                Some(mark) if !inner.is_empty() => format!("{mark}{inner}{mark}"),
                _ => inner,
            }
        }
        _ => node.children.iter().map(flatten_nested).collect(),
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_code(out: &mut String, code: &str) {
    out.push('`');
    push_escaped(out, code);
    out.push('`');
}

// The destination is written as-is; only the label is escaped.
fn push_link(out: &mut String, destination: &str, link: &Node) {
    out.push('<');
    out.push_str(destination);
    out.push('|');
    push_escaped(out, &link.literal_text());
    out.push('>');
}
