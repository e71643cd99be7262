//! Block detection for `FOR` loops and `IF` conditionals
//!
//! A block is either multi-line, with the opener alone on its line and the
//! closer on a later line at the same indentation:
//!
//! ```text
//!     {{% FOR color %}}
//!     static let {{%color.identity%}} = ...
//!     {{% END color %}}
//! ```
//!
//! or inline, with opener and closer on one line:
//!
//! ```text
//! .font(size: 12){{% IF textStyle.alignment %}}.align(.{{%textStyle.alignment%}}){{% ENDIF %}}
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;

/// Block keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    For,
    If,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::For => "FOR",
            Keyword::If => "IF",
        }
    }

    /// The default closing marker text for a block with this identifier
    pub fn close_marker(&self, identifier: &str) -> String {
        match self {
            Keyword::For => format!("END {}", identifier),
            Keyword::If => "ENDIF".to_string(),
        }
    }

    fn standalone_pattern(&self) -> &'static Regex {
        match self {
            Keyword::For => &*STANDALONE_FOR,
            Keyword::If => &*STANDALONE_IF,
        }
    }

    fn opener_pattern(&self) -> &'static Regex {
        match self {
            Keyword::For => &*OPENER_FOR,
            Keyword::If => &*OPENER_IF,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opener alone on its line; captures indentation and identifier
static STANDALONE_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)\{\{%\s*FOR\s+([^\s%]+)\s*%\}\}\s*$").expect("Invalid FOR pattern")
});

static STANDALONE_IF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)\{\{%\s*IF\s+([^\s%]+)\s*%\}\}\s*$").expect("Invalid IF pattern")
});

/// Opener anywhere on a line; captures the identifier
static OPENER_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{%\s*FOR\s+([^\s%]+)\s*%\}\}").expect("Invalid FOR opener pattern")
});

static OPENER_IF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{%\s*IF\s+([^\s%]+)\s*%\}\}").expect("Invalid IF opener pattern")
});

/// Any `{{% ... %}}` marker; captures its trimmed content
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{%\s*(.*?)\s*%\}\}").expect("Invalid marker pattern"));

/// Where a block's body lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody<'a> {
    /// Lines of the window, exclusive of the opener and closer
    Lines(Range<usize>),
    /// Text between the markers of an inline block
    Inline(&'a str),
}

/// A detected block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    pub keyword: Keyword,
    pub identifier: &'a str,
    pub body: BlockBody<'a>,
    /// Text before the opener of an inline block; empty for multi-line blocks
    pub pre_body: &'a str,
    /// Text after the closer of an inline block; empty for multi-line blocks
    pub post_body: &'a str,
    /// Window index of the closing line; the opener line for inline blocks
    pub end_line_index: usize,
}

impl Block<'_> {
    pub fn is_inline(&self) -> bool {
        matches!(self.body, BlockBody::Inline(_))
    }
}

/// The keyword whose opener comes first on `line`, if any
pub fn first_opener(line: &str) -> Option<Keyword> {
    [Keyword::For, Keyword::If]
        .into_iter()
        .filter_map(|keyword| keyword.opener_pattern().find(line).map(|m| (m.start(), keyword)))
        .min_by_key(|&(start, _)| start)
        .map(|(_, keyword)| keyword)
}

/// Detect a `keyword` block opened on `lines[start]`.
///
/// `end_marker` overrides the closing marker text (`END <identifier>` for
/// `FOR`, `ENDIF` for `IF`). `offset` is the template line of `lines[0]`
/// and only feeds error reporting.
///
/// Returns `Ok(None)` when the line opens no such block, and
/// [`ParseError::OpenBlock`] when it opens one that is never closed.
pub fn detect<'a>(
    keyword: Keyword,
    end_marker: Option<&str>,
    lines: &[&'a str],
    start: usize,
    offset: usize,
) -> Result<Option<Block<'a>>, ParseError> {
    let Some(&line) = lines.get(start) else {
        return Ok(None);
    };

    if let Some(caps) = keyword.standalone_pattern().captures(line) {
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let identifier = caps.get(2).map_or("", |m| m.as_str());
        let marker = end_marker.map_or_else(|| keyword.close_marker(identifier), str::to_string);

        let end = (start + 1..lines.len())
            .find(|&index| is_closing_line(lines[index], indent, &marker))
            .ok_or_else(|| open_block(keyword, identifier, offset + start))?;

        return Ok(Some(Block {
            keyword,
            identifier,
            body: BlockBody::Lines(start + 1..end),
            pre_body: "",
            post_body: "",
            end_line_index: end,
        }));
    }

    let Some(opener) = keyword.opener_pattern().captures(line) else {
        return Ok(None);
    };
    let (Some(whole), Some(ident)) = (opener.get(0), opener.get(1)) else {
        return Ok(None);
    };
    let identifier = ident.as_str();
    let marker = end_marker.map_or_else(|| keyword.close_marker(identifier), str::to_string);

    let close = find_inline_close(keyword, &marker, line, whole.end())
        .ok_or_else(|| open_block(keyword, identifier, offset + start))?;

    Ok(Some(Block {
        keyword,
        identifier,
        body: BlockBody::Inline(&line[whole.end()..close.start]),
        pre_body: &line[..whole.start()],
        post_body: &line[close.end..],
        end_line_index: start,
    }))
}

/// Whether `line` is exactly `indent` followed by the closing marker
fn is_closing_line(line: &str, indent: &str, marker: &str) -> bool {
    let Some(rest) = line.trim_end().strip_prefix(indent) else {
        return false;
    };
    if !rest.starts_with("{{%") {
        return false;
    }
    MARKER
        .captures(rest)
        .and_then(|caps| caps.get(0).zip(caps.get(1)))
        .is_some_and(|(whole, content)| whole.len() == rest.len() && normalize(content.as_str()) == marker)
}

/// Find the closer matching an inline opener that ends at `from`.
///
/// Openers of the same keyword in between must be closed first.
fn find_inline_close(keyword: Keyword, marker: &str, line: &str, from: usize) -> Option<Range<usize>> {
    let mut depth = 0usize;
    for caps in MARKER.captures_iter(&line[from..]) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let content = normalize(content.as_str());

        if content == marker {
            if depth == 0 {
                return Some(from + whole.start()..from + whole.end());
            }
            depth -= 1;
        } else if content
            .strip_prefix(keyword.as_str())
            .is_some_and(|rest| rest.starts_with(' '))
        {
            depth += 1;
        }
    }
    None
}

/// Collapse inner whitespace runs so `END   color` matches `END color`
fn normalize(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn open_block(keyword: Keyword, identifier: &str, line: usize) -> ParseError {
    ParseError::OpenBlock {
        keyword,
        identifier: identifier.to_string(),
        line,
    }
}
