use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Character styling carried by a rich text run.
///
/// Bold and italic accumulate through nested emphasis. Code is never
/// combined with the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Style {
    pub const PLAIN: Style = Style {
        bold: false,
        italic: false,
        code: false,
    };

    pub const CODE: Style = Style {
        bold: false,
        italic: false,
        code: true,
    };

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }

    /// Style inherited by the children of an emphasis node.
    ///
    /// Level 2 (strong) adds bold, level 1 adds italic. Any other level
    /// leaves the style unchanged.
    pub fn with_emphasis(self, level: u8) -> Style {
        Style {
            bold: self.bold || level == 2,
            italic: self.italic || level == 1,
            code: self.code,
        }
    }
}

/// A run of text with a single style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    #[serde(skip_serializing_if = "Style::is_plain")]
    pub style: Style,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::PLAIN,
        }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::CODE,
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// An element inside a rich text section: a styled run or a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum InlineElement {
    #[serde(rename = "text")]
    Text(TextRun),
    #[serde(rename = "link")]
    Link { url: String, text: String },
}

impl From<TextRun> for InlineElement {
    fn from(run: TextRun) -> Self {
        InlineElement::Text(run)
    }
}

/// A paragraph-like sequence of inline elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub elements: Vec<InlineElement>,
}

impl Section {
    pub fn new(elements: Vec<InlineElement>) -> Self {
        Self { elements }
    }
}

/// A single-level list (ordered or bulleted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<Section>,
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Item<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            elements: &'a [InlineElement],
        }

        let items: Vec<Item<'_>> = self
            .items
            .iter()
            .map(|section| Item {
                kind: "rich_text_section",
                elements: &section.elements,
            })
            .collect();

        let mut state = serializer.serialize_struct("List", 2)?;
        state.serialize_field("style", if self.ordered { "ordered" } else { "bullet" })?;
        state.serialize_field("elements", &items)?;
        state.end()
    }
}

/// Elements of a rich text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum RichElement {
    #[serde(rename = "rich_text_section")]
    Section(Section),
    #[serde(rename = "rich_text_list")]
    List(List),
    #[serde(rename = "rich_text_quote")]
    Quote(Section),
}

/// One output unit: a block in a Slack message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Block {
    /// Plain-text title.
    #[serde(rename = "header")]
    Header {
        #[serde(serialize_with = "plain_text_object")]
        text: String,
    },
    /// Section whose text is a single mrkdwn-encoded string.
    #[serde(rename = "section")]
    Mrkdwn {
        #[serde(serialize_with = "mrkdwn_object")]
        text: String,
    },
    /// Structured rich text.
    #[serde(rename = "rich_text")]
    RichText { elements: Vec<RichElement> },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Block::Mrkdwn { text: text.into() }
    }

    /// A rich text block holding one section.
    pub fn section(elements: Vec<InlineElement>) -> Self {
        Block::RichText {
            elements: vec![RichElement::Section(Section::new(elements))],
        }
    }

    /// A rich text block holding one verbatim code run.
    pub fn code(text: impl Into<String>) -> Self {
        Self::section(vec![TextRun::code(text).into()])
    }

    pub fn list(ordered: bool, items: Vec<Section>) -> Self {
        Block::RichText {
            elements: vec![RichElement::List(List { ordered, items })],
        }
    }

    pub fn quote(elements: Vec<InlineElement>) -> Self {
        Block::RichText {
            elements: vec![RichElement::Quote(Section::new(elements))],
        }
    }

    /// Block Kit type name, as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Header { .. } => "header",
            Block::Mrkdwn { .. } => "section",
            Block::RichText { .. } => "rich_text",
        }
    }
}

fn plain_text_object<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TextObject", 3)?;
    state.serialize_field("type", "plain_text")?;
    state.serialize_field("text", text)?;
    state.serialize_field("emoji", &true)?;
    state.end()
}

fn mrkdwn_object<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TextObject", 2)?;
    state.serialize_field("type", "mrkdwn")?;
    state.serialize_field("text", text)?;
    state.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn emphasis_levels_accumulate() {
        let style = Style::PLAIN.with_emphasis(2).with_emphasis(1);
        assert!(style.bold && style.italic && !style.code);
        assert_eq!(Style::PLAIN.with_emphasis(3), Style::PLAIN);
    }

    #[test]
    fn header_serializes_as_plain_text() {
        let value = serde_json::to_value(Block::header("Title")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "header",
                "text": { "type": "plain_text", "text": "Title", "emoji": true }
            })
        );
    }

    #[test]
    fn mrkdwn_serializes_as_section() {
        let value = serde_json::to_value(Block::mrkdwn("*hi*")).unwrap();
        assert_eq!(
            value,
            json!({ "type": "section", "text": { "type": "mrkdwn", "text": "*hi*" } })
        );
    }

    #[test]
    fn plain_style_is_omitted() {
        let value = serde_json::to_value(Block::section(vec![
            TextRun::plain("a").into(),
            TextRun::styled("b", Style::PLAIN.with_emphasis(2)).into(),
        ]))
        .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "rich_text",
                "elements": [{
                    "type": "rich_text_section",
                    "elements": [
                        { "type": "text", "text": "a" },
                        { "type": "text", "text": "b", "style": { "bold": true } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn list_items_are_tagged_sections() {
        let block = Block::list(
            true,
            vec![
                Section::new(vec![TextRun::plain("one").into()]),
                Section::new(vec![InlineElement::Link {
                    url: "https://example.com".into(),
                    text: "two".into(),
                }]),
            ],
        );
        let value = serde_json::to_value(block).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "rich_text",
                "elements": [{
                    "type": "rich_text_list",
                    "style": "ordered",
                    "elements": [
                        {
                            "type": "rich_text_section",
                            "elements": [{ "type": "text", "text": "one" }]
                        },
                        {
                            "type": "rich_text_section",
                            "elements": [
                                { "type": "link", "url": "https://example.com", "text": "two" }
                            ]
                        }
                    ]
                }]
            })
        );
    }

    #[test]
    fn quote_and_code_shapes() {
        let quote = serde_json::to_value(Block::quote(vec![TextRun::plain("q").into()])).unwrap();
        assert_eq!(quote["elements"][0]["type"], "rich_text_quote");

        let code = serde_json::to_value(Block::code("x = 1")).unwrap();
        assert_eq!(
            code["elements"][0]["elements"][0],
            json!({ "type": "text", "text": "x = 1", "style": { "code": true } })
        );
    }

    #[test]
    fn kind_matches_serialized_type() {
        for block in [Block::header("h"), Block::mrkdwn("m"), Block::code("c")] {
            let value = serde_json::to_value(&block).unwrap();
            assert_eq!(value["type"], block.kind());
        }
    }
}
