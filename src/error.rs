//! Error types for template parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::template::Keyword;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that abort rendering a template.
///
/// Line numbers are 0-based indexes into the template's lines; messages
/// print them 1-based.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A `FOR` block over something other than `color` or `textStyle`
    #[error("unknown loop '{identifier}' on line {}", .line + 1)]
    UnknownLoop { identifier: String, line: usize },

    /// A block opener without a matching closer
    #[error("{keyword} block '{identifier}' opened on line {} is never closed", .line + 1)]
    OpenBlock {
        keyword: Keyword,
        identifier: String,
        line: usize,
    },

    #[error("unknown token '{path}' on line {}", .line + 1)]
    UnknownToken { path: String, line: usize },

    #[error("unknown transformation '{spec}' on line {}", .line + 1)]
    UnknownTransformation { spec: String, line: usize },

    /// A `textStyle.color.*` token whose style matches no color in the bundle
    #[error("text style '{text_style}' has no matching color (line {})", .line + 1)]
    MissingColorForTextStyle { text_style: String, line: usize },

    /// Asset identities that collide with reserved identifiers
    #[error("prohibited identities: {}", identities.join(", "))]
    ProhibitedIdentities { identities: Vec<String> },

    #[error("blocks nested deeper than {max_depth} levels on line {}", .line + 1)]
    NestingTooDeep { max_depth: usize, line: usize },
}

impl ParseError {
    /// The template line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnknownLoop { line, .. }
            | ParseError::OpenBlock { line, .. }
            | ParseError::UnknownToken { line, .. }
            | ParseError::UnknownTransformation { line, .. }
            | ParseError::MissingColorForTextStyle { line, .. }
            | ParseError::NestingTooDeep { line, .. } => Some(*line),
            ParseError::ProhibitedIdentities { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self
            .line()
            .map(|line| line_span(source, line))
            .unwrap_or(0..0);

        let label = match self {
            ParseError::UnknownLoop { .. } => "only `color` and `textStyle` can be looped over".to_string(),
            ParseError::OpenBlock { keyword, identifier, .. } => {
                format!("expected a matching {} for this block", keyword.close_marker(identifier))
            }
            ParseError::UnknownToken { path, .. } => format!("`{}` is not a known token", path),
            ParseError::UnknownTransformation { spec, .. } => {
                format!("`{}` is not lowercase, uppercase or replace(a, b)", spec)
            }
            ParseError::MissingColorForTextStyle { text_style, .. } => {
                format!("no color in the bundle has the RGBA value of '{}'", text_style)
            }
            ParseError::ProhibitedIdentities { .. } => {
                "rename these assets or adjust the reserved identifiers".to_string()
            }
            ParseError::NestingTooDeep { .. } => "block nesting limit reached here".to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Byte span of the given 0-based line, excluding its newline
fn line_span(source: &str, line: usize) -> Span {
    let mut start = 0;
    for (index, text) in source.split('\n').enumerate() {
        if index == line {
            return start..start + text.len();
        }
        start += text.len() + 1;
    }
    source.len()..source.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_span() {
        let source = "first\nsecond\n\nfourth";
        assert_eq!(line_span(source, 0), 0..5);
        assert_eq!(line_span(source, 1), 6..12);
        assert_eq!(line_span(source, 2), 13..13);
        assert_eq!(line_span(source, 3), 14..20);
        assert_eq!(line_span(source, 9), 20..20);
    }

    #[test]
    fn test_messages_are_one_based() {
        let err = ParseError::OpenBlock {
            keyword: Keyword::For,
            identifier: "color".to_string(),
            line: 0,
        };
        assert_eq!(err.to_string(), "FOR block 'color' opened on line 1 is never closed");

        let err = ParseError::ProhibitedIdentities {
            identities: vec!["clear".to_string(), "white".to_string()],
        };
        assert_eq!(err.to_string(), "prohibited identities: clear, white");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_format_points_at_line() {
        let source = "header\n{{%color.nope%}}\nfooter";
        let err = ParseError::UnknownToken {
            path: "color.nope".to_string(),
            line: 1,
        };
        let report = err.format(source, "colors.swift.template");
        assert!(report.contains("unknown token 'color.nope' on line 2"));
        assert!(report.contains("colors.swift.template"));
        assert!(report.contains("is not a known token"));
    }
}
