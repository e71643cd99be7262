//! Parser for transformation calls using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::lexer::{self, Token};

/// A parsed but not yet validated call: `name` or `name(arg, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse a transformation call.
///
/// Returns `None` for anything that is not a single well-formed call:
/// unlexable input, unbalanced parentheses or trailing tokens.
pub fn parse_call(input: &str) -> Option<Call> {
    let len = input.len();
    let tokens = lexer::lex(input).ok()?;

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    call_parser().parse(token_stream).into_result().ok()
}

fn call_parser<'a, I>() -> impl Parser<'a, I, Call, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! {
        Token::Text(s) => s,
    };

    // An argument may be empty, as in `replace(-,)`
    let argument = select! {
        Token::Text(s) => s,
        Token::Quoted(s) => s,
    }
    .or_not()
    .map(Option::unwrap_or_default);

    let arguments = argument
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
        // `name()` takes no arguments rather than one empty one
        .map(|args: Vec<String>| {
            if args.len() == 1 && args[0].is_empty() {
                Vec::new()
            } else {
                args
            }
        });

    name.then(arguments.or_not())
        .then_ignore(end())
        .map(|(name, args)| Call {
            name,
            args: args.unwrap_or_default(),
        })
}
