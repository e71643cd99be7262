//! Lexer for transformation calls using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
pub enum Token {
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Quoted(String),

    // Bare text: names and unquoted arguments. Inner spaces are kept, outer
    // ones are dropped.
    #[regex(r#"[^(),"\s][^(),"]*"#, |lex| lex.slice().trim_end().to_string())]
    Text(String),
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unescape(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Lex a transformation call into tokens with spans.
///
/// Returns the span of the first unlexable character on failure.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(tok) => Ok((tok, span)),
            Err(()) => Err(span),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(tokens("lowercase"), vec![Token::Text("lowercase".to_string())]);
    }

    #[test]
    fn test_call_with_bare_arguments() {
        assert_eq!(
            tokens("replace(-, _)"),
            vec![
                Token::Text("replace".to_string()),
                Token::ParenOpen,
                Token::Text("-".to_string()),
                Token::Comma,
                Token::Text("_".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_inner_spaces_kept() {
        assert_eq!(
            tokens("replace( a b , c )"),
            vec![
                Token::Text("replace".to_string()),
                Token::ParenOpen,
                Token::Text("a b".to_string()),
                Token::Comma,
                Token::Text("c".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_quoted_arguments() {
        assert_eq!(
            tokens(r#"replace(", ", "\"")"#),
            vec![
                Token::Text("replace".to_string()),
                Token::ParenOpen,
                Token::Quoted(", ".to_string()),
                Token::Comma,
                Token::Quoted("\"".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_fails() {
        assert!(lex(r#"replace("abc, d)"#).is_err());
    }
}
