//! The template engine
//!
//! Templates are plain text with `{{% ... %}}` markers:
//!
//! ```text
//! {{% FOR color %}}
//!     static let {{%color.identity%}} = Color(hex: "{{%color.argb|uppercase%}}")
//! {{% END color %}}
//! ```
//!
//! Loops bind each color or text style in turn, conditionals test whether
//! an optional token has a value, and tokens resolve against the bound
//! asset before passing through their transformation chain.

mod block;
mod processor;
mod token;

pub use block::{detect, first_opener, Block, BlockBody, Keyword};
pub use processor::{Engine, MAX_DEPTH};
pub use token::{format_number, Binding, ResolveError, Token};
