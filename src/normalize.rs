//! Source text normalization ahead of parsing.
//!
//! Markdown folds consecutive lines into one paragraph. Chat authors expect
//! every line to stand on its own, so a lone line break is promoted to a
//! paragraph break before the text reaches the parser.

use std::borrow::Cow;

use crate::config::NormalizeConfig;

/// Double every run of exactly one `\n`. Runs of two or more are kept.
///
/// Borrows the input when nothing changes, which makes the transform
/// visibly idempotent.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    double_single_newlines(text, false)
}

/// Apply every normalization step enabled in `config`.
pub fn normalize<'a>(text: &'a str, config: &NormalizeConfig) -> Cow<'a, str> {
    let text = if config.front_matter {
        strip_front_matter(text)
    } else {
        text
    };
    double_single_newlines(text, config.preserve_code_fences)
}

/// Strip a leading YAML front matter block delimited by `---` lines.
pub fn strip_front_matter(markdown: &str) -> &str {
    let Some(body) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return markdown;
    };
    // Find the closing ---
    if let Some(end) = body.find("\n---") {
        let after = &body[end + 4..];
        // The delimiter must be alone on its line.
        let rest = after.trim_start_matches([' ', '\t', '\r']);
        if rest.is_empty() || rest.starts_with('\n') {
            return rest.trim_start_matches(['\r', '\n']);
        }
    }
    markdown
}

fn double_single_newlines(text: &str, preserve_code_fences: bool) -> Cow<'_, str> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut fences = FenceTracker::default();
    let mut out: Option<String> = None;
    let mut line_end = 0;
    let mut copied = 0;

    for (i, line) in lines.iter().enumerate() {
        line_end += line.len();
        let in_fence = preserve_code_fences && fences.feed(line);
        if in_fence || !line.ends_with('\n') {
            continue;
        }

        // The terminator of a blank line continues the previous line's run.
        let continues_run = i > 0 && *line == "\n";
        let run_continues = lines.get(i + 1).is_some_and(|next| *next == "\n");
        if continues_run || run_continues {
            continue;
        }

        let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + lines.len()));
        buf.push_str(&text[copied..line_end]);
        buf.push('\n');
        copied = line_end;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(text),
    }
}

/// Tracks whether the current line sits inside a fenced code block.
#[derive(Default)]
struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed the next line. Returns true when its terminator belongs to the
    /// interior of a fenced block (opening fence or content lines).
    fn feed(&mut self, line: &str) -> bool {
        let fence = fence_marker(line);
        match (self.open, fence) {
            (None, Some((marker, len, _))) => {
                self.open = Some((marker, len));
                true
            }
            (None, None) => false,
            (Some((open_marker, open_len)), Some((marker, len, has_info)))
                if marker == open_marker && len >= open_len && !has_info =>
            {
                self.open = None;
                false
            }
            (Some(_), _) => true,
        }
    }
}

/// Fence character, fence length and whether text follows the fence.
fn fence_marker(line: &str) -> Option<(char, usize, bool)> {
    let rest = line.trim_start_matches(' ');
    if line.len() - rest.len() > 3 {
        return None;
    }
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let has_info = !rest[len..].trim().is_empty();
    Some((marker, len, has_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("line one\nline two", "line one\n\nline two")]
    #[case("a\nb\nc", "a\n\nb\n\nc")]
    #[case("a\n\nb", "a\n\nb")]
    #[case("a\n\n\nb", "a\n\n\nb")]
    #[case("a\n", "a\n\n")]
    #[case("\na", "\n\na")]
    #[case("", "")]
    #[case("no breaks", "no breaks")]
    #[case("# T\ntext\n\n- x\n- y", "# T\n\ntext\n\n- x\n\n- y")]
    fn doubles_only_single_newlines(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_newlines(input), expected);
    }

    #[rstest]
    #[case("a\nb\nc")]
    #[case("```\ncode\n```")]
    #[case("\n\n\n")]
    #[case("x\n\ny\nz\n")]
    fn idempotent(#[case] input: &str) {
        let once = normalize_newlines(input).into_owned();
        let twice = normalize_newlines(&once);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(twice, once);
    }

    #[test]
    fn normalized_input_is_borrowed() {
        assert!(matches!(normalize_newlines("a\n\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn code_fences_are_doubled_by_default() {
        let config = NormalizeConfig::default();
        assert_eq!(
            normalize("```\na\nb\n```\nafter", &config),
            "```\n\na\n\nb\n\n```\n\nafter"
        );
    }

    #[test]
    fn code_fences_can_be_preserved() {
        let config = NormalizeConfig {
            preserve_code_fences: true,
            ..NormalizeConfig::default()
        };
        assert_eq!(
            normalize("intro\n```rust\na\nb\n```\nafter", &config),
            "intro\n\n```rust\na\nb\n```\n\nafter"
        );
        // A fence with an info string does not close the block.
        assert_eq!(
            normalize("~~~\na\n~~~ x\nb\n~~~~\nc", &config),
            "~~~\na\n~~~ x\nb\n~~~~\n\nc"
        );
    }

    #[test]
    fn strips_front_matter() {
        assert_eq!(strip_front_matter("---\ntitle: x\n---\n# Body"), "# Body");
        assert_eq!(strip_front_matter("---\ntitle: x\n---"), "");
        assert_eq!(strip_front_matter("# No front matter"), "# No front matter");
        assert_eq!(strip_front_matter("---\nunterminated"), "---\nunterminated");
        assert_eq!(strip_front_matter("---\na\n--- b\n"), "---\na\n--- b\n");
    }

    #[test]
    fn front_matter_only_when_enabled() {
        let source = "---\nk: v\n---\ntext";
        let off = NormalizeConfig::default();
        let on = NormalizeConfig {
            front_matter: true,
            ..NormalizeConfig::default()
        };
        assert_eq!(normalize(source, &off), "---\n\nk: v\n\n---\n\ntext");
        assert_eq!(normalize(source, &on), "text");
    }
}
