//! stylegen - generate source code from design tokens
//!
//! This library renders small text templates against a bundle of design
//! assets (colors, text styles, spacing units) and produces code such as
//! color constants or font catalogs.
//!
//! # Example
//!
//! ```rust
//! use stylegen::{parse, AssetBundle, Color, EngineConfig};
//!
//! let bundle = AssetBundle::new().with_colors(vec![Color::new("Brand Red", 255, 0, 0, 1.0)]);
//! let template = "{{% FOR color %}}\nlet {{%color.identity%}} = \"{{%color.argb%}}\"\n{{% END color %}}";
//!
//! let code = parse(template, &bundle, &EngineConfig::default()).unwrap();
//! assert_eq!(code, "let brandRed = \"#ffff0000\"");
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod identity;
pub mod template;
pub mod transform;

pub use assets::{AssetBundle, AssetError, Color, Rgba, Spacing, TextStyle};
pub use config::{ConfigError, EngineConfig};
pub use error::ParseError;
pub use identity::{Identity, IdentityStyle};
pub use template::{Engine, Keyword};
pub use transform::{Pipeline, Transformation};

/// Render a template against `bundle` with the given configuration
///
/// This is the main entry point for the library. It is a shorthand for
/// [`Engine::parse`].
///
/// # Example
///
/// ```rust
/// use stylegen::{parse, AssetBundle, EngineConfig, ParseError};
///
/// let bundle = AssetBundle::new();
/// let err = parse("{{% FOR color %}}\nno end", &bundle, &EngineConfig::default()).unwrap_err();
/// assert!(matches!(err, ParseError::OpenBlock { .. }));
/// ```
pub fn parse(template: &str, bundle: &AssetBundle, config: &EngineConfig) -> Result<String, ParseError> {
    Engine::new(bundle, config).parse(template)
}
