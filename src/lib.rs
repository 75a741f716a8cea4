//! Convert Markdown into Slack Block Kit blocks.
//!
//! ```
//! let blocks = slackdown::convert("# Title\nSome **bold** text.").unwrap();
//! assert_eq!(blocks.len(), 2);
//! let json = slackdown::to_json(&blocks, false).unwrap();
//! assert!(json.starts_with(r#"{"blocks":[{"type":"header""#));
//! ```

mod block;
mod config;
mod dispatch;
mod error;
pub mod inline;
pub mod normalize;
pub mod syntax;

pub use block::{Block, InlineElement, List, RichElement, Section, Style, TextRun};
pub use config::{Config, EmphasisPolicy, FormatConfig, NormalizeConfig, QuoteStyle};
pub use error::{ConfigError, ConversionError, SyntaxError};

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

/// Convert markdown to blocks using the bundled default config.
pub fn convert(markdown: &str) -> Result<Vec<Block>, ConversionError> {
    convert_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to blocks with custom config.
pub fn convert_with_config(markdown: &str, config: &Config) -> Result<Vec<Block>, ConversionError> {
    let source = normalize::normalize(markdown, &config.normalize);
    debug!(
        changed = matches!(source, Cow::Owned(_)),
        input_len = markdown.len(),
        output_len = source.len(),
        "normalized source"
    );
    let doc = syntax::parse(&source)?;
    dispatch::dispatch(&doc, &source, &config.format)
}

/// Serialize blocks as a Block Kit message payload: `{"blocks": [...]}`.
pub fn to_json(blocks: &[Block], pretty: bool) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Message<'a> {
        blocks: &'a [Block],
    }

    let message = Message { blocks };
    if pretty {
        serde_json::to_string_pretty(&message)
    } else {
        serde_json::to_string(&message)
    }
}
