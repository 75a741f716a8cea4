//! Block-level dispatch: one Block Kit block per supported markdown block.

use tracing::{debug, trace};

use crate::block::{Block, InlineElement, Section, TextRun};
use crate::config::{FormatConfig, QuoteStyle};
use crate::error::ConversionError;
use crate::inline;
use crate::syntax::{Node, NodeKind, WalkStatus, walk};

/// Convert a parsed document into blocks, in document order.
///
/// Lists and quotes consume their own children, so the walk never descends
/// into a node that already produced a block. Unsupported nodes produce
/// nothing and the walk continues into their children.
pub fn dispatch(
    doc: &Node,
    source: &str,
    format: &FormatConfig,
) -> Result<Vec<Block>, ConversionError> {
    let mut blocks = Vec::new();

    walk(doc, &mut |node: &Node| -> Result<WalkStatus, ConversionError> {
        let Some(block) = block_for(node, source, format)? else {
            if node.kind != NodeKind::Document {
                trace!(kind = node.kind.name(), "no block for node");
            }
            return Ok(WalkStatus::Continue);
        };
        debug!(
            kind = block.kind(),
            node = node.kind.name(),
            start = node.range.start,
            "emitting block"
        );
        blocks.push(block);
        Ok(WalkStatus::SkipChildren)
    })?;

    Ok(blocks)
}

fn block_for(
    node: &Node,
    source: &str,
    format: &FormatConfig,
) -> Result<Option<Block>, ConversionError> {
    let block = match &node.kind {
        // Headings are titles: inline markup passes through verbatim.
        NodeKind::Heading { level } => {
            trace!(level = *level, "header blocks have no level");
            Block::header(node.literal_lines(source)?)
        }
        NodeKind::Paragraph => Block::mrkdwn(inline::flatten(node, format.emphasis)),
        NodeKind::List { ordered } => Block::list(*ordered, list_items(node)),
        NodeKind::FencedCodeBlock { info } => {
            if !info.is_empty() {
                trace!(info = info.as_str(), "dropping code block info string");
            }
            Block::code(code_text(node))
        }
        NodeKind::CodeSpan { code } => Block::code(code.as_str()),
        NodeKind::Blockquote => Block::quote(quote_elements(node, source, format.quote)?),
        // The destination is dropped; only the label is kept.
        NodeKind::Link { .. } => Block::section(vec![TextRun::plain(node.literal_text()).into()]),
        _ => return Ok(None),
    };
    Ok(Some(block))
}

fn list_items(list: &Node) -> Vec<Section> {
    list.children
        .iter()
        .filter(|child| child.kind == NodeKind::ListItem)
        .map(|item| {
            let elements = item.first_child().map(inline::structured).unwrap_or_default();
            Section::new(elements)
        })
        .collect()
}

/// Verbatim code block content without the blank lines around it.
fn code_text(code: &Node) -> String {
    code.literal_text().trim_matches(['\r', '\n']).to_string()
}

fn quote_elements(
    quote: &Node,
    source: &str,
    style: QuoteStyle,
) -> Result<Vec<InlineElement>, ConversionError> {
    let paragraphs = quote
        .children
        .iter()
        .filter(|child| child.kind == NodeKind::Paragraph);

    match style {
        QuoteStyle::Raw => {
            let mut text = String::new();
            for paragraph in paragraphs {
                text.push_str(&paragraph.literal_lines(source)?);
            }
            Ok(vec![TextRun::plain(text).into()])
        }
        QuoteStyle::Styled => Ok(inline::merge_plain(
            paragraphs.flat_map(inline::structured).collect(),
        )),
    }
}
