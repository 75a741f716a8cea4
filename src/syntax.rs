//! Markdown syntax tree.
//!
//! `pulldown-cmark` produces a flat stream of start/end events. The
//! conversion engine wants an immutable tree it can dispatch on, so this
//! module folds the offset-annotated event stream into owned [`Node`]s and
//! offers a small visitor ([`walk`]) over them.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::error::SyntaxError;

/// Parser configuration shared by every conversion. No extensions:
/// tables, footnotes, task lists and strikethrough are not converted.
const PARSER_OPTIONS: Options = Options::empty();

/// The kind of a syntax node, with the per-kind data the engine reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading { level: u8 },
    Paragraph,
    List { ordered: bool },
    ListItem,
    FencedCodeBlock { info: String },
    CodeSpan { code: String },
    Blockquote,
    Link { destination: String },
    /// Level 1 is light emphasis, level 2 is strong.
    Emphasis { level: u8 },
    /// Literal text. Soft and hard line breaks are text nodes holding
    /// `"\n"` with `line_break` set.
    Text { value: String, line_break: bool },
    /// Inline content without its own formatting, such as images and
    /// inline HTML. Its text children are still rendered.
    InlineOther,
    Other,
}

impl NodeKind {
    fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeKind::Text { .. }
                | NodeKind::CodeSpan { .. }
                | NodeKind::Link { .. }
                | NodeKind::Emphasis { .. }
                | NodeKind::InlineOther
        )
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::FencedCodeBlock { .. } => "fenced_code_block",
            NodeKind::CodeSpan { .. } => "code_span",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Link { .. } => "link",
            NodeKind::Emphasis { .. } => "emphasis",
            NodeKind::Text { .. } => "text",
            NodeKind::InlineOther => "inline_other",
            NodeKind::Other => "other",
        }
    }
}

/// A node of the syntax tree. `range` is the byte range of the node in the
/// source it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range<usize>,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Concatenated values of the direct text children.
    pub fn literal_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match &child.kind {
                NodeKind::Text { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Raw source lines of a leaf block, joined without line terminators.
    ///
    /// Inline markup is left as written. Lines are delimited by the
    /// line-break text nodes among the direct children; continuation lines
    /// lose their leading indentation and `>` markers.
    pub fn literal_lines(&self, source: &str) -> Result<String, SyntaxError> {
        let mut out = String::new();
        let mut line: Option<Range<usize>> = None;

        for child in &self.children {
            if matches!(child.kind, NodeKind::Text { line_break: true, .. }) {
                if let Some(range) = line.take() {
                    push_line(&mut out, source, range)?;
                }
                continue;
            }
            line = Some(match line {
                Some(range) => range.start..child.range.end.max(range.end),
                None => child.range.clone(),
            });
        }
        if let Some(range) = line {
            push_line(&mut out, source, range)?;
        }
        Ok(out)
    }
}

fn push_line(out: &mut String, source: &str, range: Range<usize>) -> Result<(), SyntaxError> {
    let text = source
        .get(range.clone())
        .ok_or(SyntaxError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            len: source.len(),
        })?;

    // An inline element may itself span several source lines.
    for (i, part) in text.split('\n').enumerate() {
        let part = part.strip_suffix('\r').unwrap_or(part);
        if i == 0 {
            out.push_str(part);
        } else {
            out.push_str(part.trim_start_matches([' ', '\t', '>']));
        }
    }
    Ok(())
}

/// Parse markdown into a syntax tree rooted at a [`NodeKind::Document`].
pub fn parse(source: &str) -> Result<Node, SyntaxError> {
    let parser = Parser::new_ext(source, PARSER_OPTIONS).into_offset_iter();
    let mut stack = vec![Node::new(NodeKind::Document, 0..source.len())];

    for (event, range) in parser {
        match event {
            Event::Start(tag) => {
                stack.push(Node::new(kind_of(tag), range));
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(SyntaxError::UnbalancedEnd { offset: range.start });
                }
                if let Some(mut node) = stack.pop() {
                    if node.kind == NodeKind::ListItem {
                        wrap_inline_content(&mut node);
                    }
                    attach(&mut stack, node);
                }
            }
            Event::Text(text) => {
                let kind = NodeKind::Text {
                    value: text.into_string(),
                    line_break: false,
                };
                attach(&mut stack, Node::new(kind, range));
            }
            Event::Code(code) => {
                let kind = NodeKind::CodeSpan {
                    code: code.into_string(),
                };
                attach(&mut stack, Node::new(kind, range));
            }
            Event::SoftBreak | Event::HardBreak => {
                let kind = NodeKind::Text {
                    value: "\n".to_string(),
                    line_break: true,
                };
                attach(&mut stack, Node::new(kind, range));
            }
            Event::InlineHtml(_) => attach(&mut stack, Node::new(NodeKind::InlineOther, range)),
            // Block HTML, rules and anything else the engine does not convert.
            _ => attach(&mut stack, Node::new(NodeKind::Other, range)),
        }
    }

    match stack.len() {
        1 => stack.pop().ok_or(SyntaxError::UnclosedNode { offset: 0 }),
        _ => {
            let offset = stack.last().map(|node| node.range.start).unwrap_or(0);
            Err(SyntaxError::UnclosedNode { offset })
        }
    }
}

fn attach(stack: &mut [Node], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn kind_of(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading {
            level: heading_level_to_u8(level),
        },
        Tag::BlockQuote(_) => NodeKind::Blockquote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::FencedCodeBlock {
            info: info.into_string(),
        },
        Tag::List(first_number) => NodeKind::List {
            ordered: first_number.is_some(),
        },
        Tag::Item => NodeKind::ListItem,
        Tag::Emphasis => NodeKind::Emphasis { level: 1 },
        Tag::Strong => NodeKind::Emphasis { level: 2 },
        Tag::Link { dest_url, .. } => NodeKind::Link {
            destination: dest_url.into_string(),
        },
        Tag::Image { .. } => NodeKind::InlineOther,
        _ => NodeKind::Other,
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Tight list items hold their inline content directly. Wrap each run of
/// inline children in a paragraph so every item starts with a block.
fn wrap_inline_content(item: &mut Node) {
    if !item.children.iter().any(|child| child.kind.is_inline()) {
        return;
    }

    let mut wrapped = Vec::with_capacity(item.children.len());
    let mut run: Vec<Node> = Vec::new();
    for child in std::mem::take(&mut item.children) {
        if child.kind.is_inline() {
            run.push(child);
        } else {
            flush_paragraph(&mut run, &mut wrapped);
            wrapped.push(child);
        }
    }
    flush_paragraph(&mut run, &mut wrapped);
    item.children = wrapped;
}

fn flush_paragraph(run: &mut Vec<Node>, out: &mut Vec<Node>) {
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return;
    };
    let mut paragraph = Node::new(NodeKind::Paragraph, first.range.start..last.range.end);
    paragraph.children = std::mem::take(run);
    out.push(paragraph);
}

/// What [`walk`] does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    Continue,
    SkipChildren,
    Stop,
}

/// Visit `node` and its descendants in document order.
///
/// The visitor decides whether to descend into a node's children. An error
/// from the visitor aborts the walk and is returned unchanged.
pub fn walk<E, F>(node: &Node, visitor: &mut F) -> Result<WalkStatus, E>
where
    F: FnMut(&Node) -> Result<WalkStatus, E>,
{
    match visitor(node)? {
        WalkStatus::Stop => return Ok(WalkStatus::Stop),
        WalkStatus::SkipChildren => return Ok(WalkStatus::Continue),
        WalkStatus::Continue => {}
    }
    for child in &node.children {
        if walk(child, visitor)? == WalkStatus::Stop {
            return Ok(WalkStatus::Stop);
        }
    }
    Ok(WalkStatus::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(node: &Node) -> Vec<&'static str> {
        node.children.iter().map(|c| c.kind.name()).collect()
    }

    #[test]
    fn top_level_blocks_in_order() {
        let doc = parse("# Title\n\ntext\n\n- a\n\n> q\n\n```\ncode\n```\n").unwrap();
        assert_eq!(
            kinds(&doc),
            vec!["heading", "paragraph", "list", "blockquote", "fenced_code_block"]
        );
    }

    #[test]
    fn emphasis_levels() {
        let doc = parse("*a* **b**").unwrap();
        let paragraph = &doc.children[0];
        assert_eq!(paragraph.children[0].kind, NodeKind::Emphasis { level: 1 });
        assert_eq!(paragraph.children[2].kind, NodeKind::Emphasis { level: 2 });
    }

    #[test]
    fn link_carries_destination_and_label() {
        let doc = parse("[label](https://example.com)").unwrap();
        let link = &doc.children[0].children[0];
        assert_eq!(
            link.kind,
            NodeKind::Link {
                destination: "https://example.com".into()
            }
        );
        assert_eq!(link.literal_text(), "label");
    }

    #[test]
    fn list_ordered_flag() {
        let bullet = parse("- a").unwrap();
        let ordered = parse("1. a").unwrap();
        assert_eq!(bullet.children[0].kind, NodeKind::List { ordered: false });
        assert_eq!(ordered.children[0].kind, NodeKind::List { ordered: true });
    }

    #[test]
    fn tight_items_are_wrapped_in_paragraphs() {
        let doc = parse("- **a** b\n- c").unwrap();
        let list = &doc.children[0];
        for item in &list.children {
            assert_eq!(item.kind, NodeKind::ListItem);
            assert_eq!(item.first_child().map(|c| c.kind.name()), Some("paragraph"));
        }
        assert_eq!(list.children[0].children[0].children.len(), 2);
    }

    #[test]
    fn images_and_inline_html_stay_in_the_item_paragraph() {
        for source in ["- see ![alt](u) now", "- a <b>x</b> c"] {
            let doc = parse(source).unwrap();
            let item = &doc.children[0].children[0];
            assert_eq!(item.children.len(), 1, "{source}");
            let paragraph = &item.children[0];
            assert_eq!(paragraph.kind, NodeKind::Paragraph);
            assert!(
                paragraph.children.iter().any(|c| c.kind == NodeKind::InlineOther),
                "{source}"
            );
        }
    }

    #[test]
    fn heading_lines_are_raw() {
        let source = "## Hello **world** ##";
        let doc = parse(source).unwrap();
        assert_eq!(doc.children[0].kind, NodeKind::Heading { level: 2 });
        assert_eq!(doc.children[0].literal_lines(source).unwrap(), "Hello **world**");
    }

    #[test]
    fn paragraph_lines_drop_terminators_and_quote_markers() {
        let source = "> one *two*\n> three";
        let doc = parse(source).unwrap();
        let paragraph = &doc.children[0].children[0];
        assert_eq!(paragraph.literal_lines(source).unwrap(), "one *two*three");
    }

    #[test]
    fn empty_heading_has_no_lines() {
        let source = "#";
        let doc = parse(source).unwrap();
        assert_eq!(doc.children[0].literal_lines(source).unwrap(), "");
    }

    #[test]
    fn out_of_range_node_is_an_error() {
        let mut node = Node::new(NodeKind::Paragraph, 0..10);
        node.children.push(Node::new(
            NodeKind::Text {
                value: "x".into(),
                line_break: false,
            },
            5..10,
        ));
        assert!(matches!(
            node.literal_lines("short"),
            Err(SyntaxError::RangeOutOfBounds { start: 5, end: 10, len: 5 })
        ));
    }

    #[test]
    fn walk_respects_skip_and_stop() {
        let doc = parse("- a\n- b\n\ntext").unwrap();

        let mut seen = Vec::new();
        walk::<(), _>(&doc, &mut |node: &Node| {
            seen.push(node.kind.name());
            Ok(match node.kind {
                NodeKind::List { .. } => WalkStatus::SkipChildren,
                _ => WalkStatus::Continue,
            })
        })
        .unwrap();
        assert_eq!(seen, vec!["document", "list", "paragraph", "text"]);

        let mut count = 0;
        let status = walk::<(), _>(&doc, &mut |_: &Node| {
            count += 1;
            Ok(if count == 2 { WalkStatus::Stop } else { WalkStatus::Continue })
        })
        .unwrap();
        assert_eq!(status, WalkStatus::Stop);
        assert_eq!(count, 2);
    }

    #[test]
    fn walk_propagates_visitor_errors() {
        let doc = parse("text").unwrap();
        let result = walk(&doc, &mut |node: &Node| match node.kind {
            NodeKind::Paragraph => Err("boom"),
            _ => Ok(WalkStatus::Continue),
        });
        assert_eq!(result, Err("boom"));
    }
}
