//! Token resolution - maps dotted token paths to values of the bound asset

use thiserror::Error;

use crate::assets::{Color, Rgba, Spacing, TextStyle};
use crate::identity::{Identity, IdentityStyle};

/// Errors that can occur while resolving a token path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("unknown token: {path}")]
    UnknownToken { path: String },

    #[error("text style '{text_style}' has no matching color")]
    MissingColorForTextStyle { text_style: String },
}

/// The asset bound by the innermost enclosing loop
#[derive(Debug, Clone, Copy, Default)]
pub enum Binding<'a> {
    #[default]
    None,
    Color(&'a Color),
    TextStyle(&'a TextStyle),
    Spacing(&'a Spacing),
}

/// A resolved template placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ColorRed(u8),
    ColorGreen(u8),
    ColorBlue(u8),
    ColorAlpha(f64),
    ColorRgb(Rgba),
    ColorArgb(Rgba),
    ColorIdentity(Identity, IdentityStyle),

    TextStyleFontName(String),
    TextStyleFontFamily(String),
    TextStyleFontSize(f64),
    TextStyleFontWeight(f64),
    TextStyleFontStyle(String),
    TextStyleFontStretch(f64),
    TextStyleIdentity(Identity, IdentityStyle),
    TextStyleAlignment(Option<String>),
    TextStyleLineHeight(Option<f64>),
    TextStyleLineSpacing(Option<f64>),
    TextStyleLetterSpacing(Option<f64>),

    SpacingIdentity(Identity, IdentityStyle),
    SpacingValue(f64),
}

impl Token {
    /// Resolve a lowercased, trimmed token path against the bound asset.
    ///
    /// `colors` is the bundle's color collection, used to follow a text
    /// style's color link.
    pub fn resolve(path: &str, binding: Binding<'_>, colors: &[Color]) -> Result<Self, ResolveError> {
        let unknown = || ResolveError::UnknownToken {
            path: path.to_string(),
        };

        let (subject, field) = path.split_once('.').ok_or_else(unknown)?;
        match (subject, binding) {
            ("color", Binding::Color(color)) => color_token(color, field).ok_or_else(unknown),
            ("textstyle", Binding::TextStyle(style)) => {
                if let Some(color_field) = field.strip_prefix("color.") {
                    if !is_color_field(color_field) {
                        return Err(unknown());
                    }
                    let color = style.matching_color(colors).ok_or_else(|| {
                        ResolveError::MissingColorForTextStyle {
                            text_style: style.name.clone(),
                        }
                    })?;
                    return color_token(color, color_field).ok_or_else(unknown);
                }
                text_style_token(style, field).ok_or_else(unknown)
            }
            ("spacing", Binding::Spacing(spacing)) => spacing_token(spacing, field).ok_or_else(unknown),
            _ => Err(unknown()),
        }
    }

    /// Render the token; `None` when an optional field is absent
    pub fn render(&self) -> Option<String> {
        let value = match self {
            Token::ColorRed(v) | Token::ColorGreen(v) | Token::ColorBlue(v) => v.to_string(),
            Token::ColorAlpha(a) => format_number(*a),
            Token::ColorRgb(c) => format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b),
            Token::ColorArgb(c) => format!("#{:08x}", c.argb()),
            Token::ColorIdentity(id, style)
            | Token::TextStyleIdentity(id, style)
            | Token::SpacingIdentity(id, style) => id.render(*style),
            Token::TextStyleFontName(s) | Token::TextStyleFontFamily(s) | Token::TextStyleFontStyle(s) => {
                s.clone()
            }
            Token::TextStyleFontSize(v)
            | Token::TextStyleFontWeight(v)
            | Token::TextStyleFontStretch(v)
            | Token::SpacingValue(v) => format_number(*v),
            Token::TextStyleAlignment(s) => return s.clone(),
            Token::TextStyleLineHeight(v)
            | Token::TextStyleLineSpacing(v)
            | Token::TextStyleLetterSpacing(v) => return v.map(format_number),
        };
        Some(value)
    }
}

/// Split `identity[.style]` into a casing; `None` if `field` is not an identity path
fn identity_style(field: &str) -> Option<IdentityStyle> {
    match field.strip_prefix("identity")? {
        "" => Some(IdentityStyle::default()),
        rest => IdentityStyle::from_suffix(rest.strip_prefix('.')?),
    }
}

fn color_token(color: &Color, field: &str) -> Option<Token> {
    let token = match field {
        "r" => Token::ColorRed(color.r),
        "g" => Token::ColorGreen(color.g),
        "b" => Token::ColorBlue(color.b),
        "a" => Token::ColorAlpha(color.a),
        "rgb" => Token::ColorRgb(color.rgba()),
        "argb" => Token::ColorArgb(color.rgba()),
        _ => Token::ColorIdentity(color.identity(), identity_style(field)?),
    };
    Some(token)
}

fn is_color_field(field: &str) -> bool {
    matches!(field, "r" | "g" | "b" | "a" | "rgb" | "argb") || identity_style(field).is_some()
}

fn text_style_token(style: &TextStyle, field: &str) -> Option<Token> {
    let token = match field {
        "fontname" | "font" => Token::TextStyleFontName(style.font_postscript_name.clone()),
        "fontfamily" => Token::TextStyleFontFamily(style.font_family.clone()),
        "fontsize" => Token::TextStyleFontSize(style.font_size),
        "fontweight" => Token::TextStyleFontWeight(style.font_weight),
        "fontstyle" => Token::TextStyleFontStyle(style.font_style.clone()),
        "fontstretch" => Token::TextStyleFontStretch(style.font_stretch),
        "alignment" => Token::TextStyleAlignment(style.text_align.clone()),
        "lineheight" => Token::TextStyleLineHeight(style.line_height),
        "linespacing" => Token::TextStyleLineSpacing(style.line_spacing),
        "letterspacing" => Token::TextStyleLetterSpacing(style.letter_spacing),
        _ => Token::TextStyleIdentity(style.identity(), identity_style(field)?),
    };
    Some(token)
}

fn spacing_token(spacing: &Spacing, field: &str) -> Option<Token> {
    let token = match field {
        "value" => Token::SpacingValue(spacing.value),
        _ => Token::SpacingIdentity(spacing.identity(), identity_style(field)?),
    };
    Some(token)
}

/// Round to two decimals, dropping the fraction when the result is integral
pub fn format_number(value: f64) -> String {
    // `+ 0.0` turns -0.0 into 0.0
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}
