//! Design assets a template is rendered against
//!
//! Assets arrive fully materialized from the design-tool clients. The bundle
//! deserializes from the JSON those clients produce.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::identity::Identity;

/// Errors that can occur when loading an asset bundle
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset bundle: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse asset bundle JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// An RGBA value; alpha is in the 0.0..=1.0 range
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha scaled to a byte
    pub fn alpha_byte(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Packed 0xAARRGGBB value, used for exact color matching
    pub fn argb(&self) -> u32 {
        u32::from_be_bytes([self.alpha_byte(), self.r, self.g, self.b])
    }
}

/// A named color
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Color {
    pub name: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: f64,
}

impl Color {
    pub fn new(name: impl Into<String>, r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            name: name.into(),
            r,
            g,
            b,
            a,
        }
    }

    pub fn rgba(&self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.name.as_str())
    }
}

/// A named text style
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub name: String,
    pub font_family: String,
    pub font_postscript_name: String,
    pub font_size: f64,
    pub font_weight: f64,
    #[serde(default = "normal_font_style")]
    pub font_style: String,
    #[serde(default = "normal_font_stretch")]
    pub font_stretch: f64,
    #[serde(default, alias = "alignment")]
    pub text_align: Option<String>,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub line_spacing: Option<f64>,
    #[serde(default)]
    pub letter_spacing: Option<f64>,
    #[serde(default)]
    pub color: Option<Rgba>,
}

fn normal_font_style() -> String {
    "normal".to_string()
}

fn normal_font_stretch() -> f64 {
    1.0
}

impl TextStyle {
    /// Create a text style with the required font attributes; optional
    /// attributes start out absent.
    pub fn new(
        name: impl Into<String>,
        font_family: impl Into<String>,
        font_postscript_name: impl Into<String>,
        font_size: f64,
        font_weight: f64,
    ) -> Self {
        Self {
            name: name.into(),
            font_family: font_family.into(),
            font_postscript_name: font_postscript_name.into(),
            font_size,
            font_weight,
            font_style: normal_font_style(),
            font_stretch: normal_font_stretch(),
            text_align: None,
            line_height: None,
            line_spacing: None,
            letter_spacing: None,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: impl Into<String>) -> Self {
        self.text_align = Some(alignment.into());
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f64) -> Self {
        self.letter_spacing = Some(letter_spacing);
        self
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.name.as_str())
    }

    /// Find the color in `colors` with exactly this style's ARGB value
    pub fn matching_color<'a>(&self, colors: &'a [Color]) -> Option<&'a Color> {
        let argb = self.color?.argb();
        colors.iter().find(|c| c.rgba().argb() == argb)
    }
}

/// A named spacing unit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Spacing {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl Spacing {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            value,
            color: None,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.name.as_str())
    }
}

/// The immutable set of assets a template is rendered against
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBundle {
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub text_styles: Vec<TextStyle>,
    #[serde(default)]
    pub spacing: Vec<Spacing>,
}

impl AssetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_text_styles(mut self, text_styles: Vec<TextStyle>) -> Self {
        self.text_styles = text_styles;
        self
    }

    pub fn with_spacing(mut self, spacing: Vec<Spacing>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Load a bundle from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a bundle from a JSON string
    pub fn from_json(content: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(content)?)
    }
}
