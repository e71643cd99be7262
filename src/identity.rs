//! Identity generation - turns free-form asset names into program identifiers
//!
//! Design tools allow arbitrary names ("A great color", "Title M Regular").
//! An [`Identity`] splits such a name into words once and projects those
//! words into the usual identifier casings.

/// Tokens that are fully uppercased in camel/pascal case instead of capitalized
const UNIT_TOKENS: &[&str] = &["xxs", "xs", "s", "m", "l", "xl", "xxl", "xxxl"];

/// The casing used when an identity is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityStyle {
    #[default]
    Camel,
    Snake,
    Kebab,
    Pascal,
}

impl IdentityStyle {
    /// Parse the casing suffix of an `identity.*` token path
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "camelcase" => Some(Self::Camel),
            "snakecase" => Some(Self::Snake),
            "kebabcase" => Some(Self::Kebab),
            "pascalcase" => Some(Self::Pascal),
            _ => None,
        }
    }
}

/// A raw asset name together with the words derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    words: Vec<String>,
}

impl Identity {
    /// Create an identity from a raw name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let words = split_words(&name);
        Self { name, words }
    }

    /// The raw name this identity was derived from
    pub fn raw(&self) -> &str {
        &self.name
    }

    /// The words derived from the raw name
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn snake_case(&self) -> String {
        self.lowercased().join("_")
    }

    pub fn kebab_case(&self) -> String {
        self.lowercased().join("-")
    }

    pub fn camel_case(&self) -> String {
        let mut words = self.words.iter();
        let Some(first) = words.next() else {
            return String::new();
        };

        let mut out = first.to_lowercase();
        for word in words {
            let lower = word.to_lowercase();
            if UNIT_TOKENS.contains(&lower.as_str()) {
                out.push_str(&lower.to_uppercase());
            } else {
                out.push_str(&capitalize(&lower));
            }
        }
        out
    }

    pub fn pascal_case(&self) -> String {
        capitalize_first(&self.camel_case())
    }

    /// Render the identity in the given casing
    pub fn render(&self, style: IdentityStyle) -> String {
        match style {
            IdentityStyle::Camel => self.camel_case(),
            IdentityStyle::Snake => self.snake_case(),
            IdentityStyle::Kebab => self.kebab_case(),
            IdentityStyle::Pascal => self.pascal_case(),
        }
    }

    /// All four casings, in camel/snake/kebab/pascal order
    pub fn projections(&self) -> [String; 4] {
        [
            self.camel_case(),
            self.snake_case(),
            self.kebab_case(),
            self.pascal_case(),
        ]
    }

    fn lowercased(&self) -> Vec<String> {
        self.words.iter().map(|w| w.to_lowercase()).collect()
    }
}

/// Split a raw name into words.
///
/// Runs of non-alphanumeric characters separate words. Inside a run of
/// alphanumerics, an uppercase letter starts a new word when it follows a
/// lowercase letter or a digit, or when it ends an uppercase run and is
/// followed by a lowercase letter. So "titleMRegular" yields `title`, `M`,
/// `Regular`, "HTTPStatus" yields `HTTP`, `Status` and "HTTP" stays whole.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;
    let mut chars = name.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous = None;
            continue;
        }

        let starts_word = c.is_uppercase()
            && previous.is_some_and(|p| {
                p.is_lowercase()
                    || p.is_numeric()
                    || (p.is_uppercase() && chars.peek().is_some_and(|next| next.is_lowercase()))
            });
        if starts_word && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        current.push(c);
        previous = Some(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Uppercase the first character and lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_sentence() {
        let id = Identity::new("A great color");
        assert_eq!(id.camel_case(), "aGreatColor");
        assert_eq!(id.snake_case(), "a_great_color");
        assert_eq!(id.kebab_case(), "a-great-color");
        assert_eq!(id.pascal_case(), "AGreatColor");
    }

    #[test]
    fn test_empty_name() {
        let id = Identity::new("");
        assert_eq!(id.projections(), [String::new(), String::new(), String::new(), String::new()]);
        assert!(id.words().is_empty());
    }

    #[test]
    fn test_only_punctuation() {
        let id = Identity::new("  -- / ** ");
        assert_eq!(id.camel_case(), "");
        assert_eq!(id.snake_case(), "");
        assert_eq!(id.raw(), "  -- / ** ");
    }

    #[test]
    fn test_raw_name_preserved() {
        for name in ["", "Primary", "  padded  ", "Title M Regular", "ünïcødé"] {
            assert_eq!(Identity::new(name).raw(), name);
        }
    }

    #[test]
    fn test_unit_tokens_uppercased() {
        let id = Identity::new("Title M Regular");
        assert_eq!(id.words(), &["Title", "M", "Regular"]);
        assert_eq!(id.camel_case(), "titleMRegular");
        assert_eq!(id.pascal_case(), "TitleMRegular");
        assert_eq!(id.snake_case(), "title_m_regular");

        assert_eq!(Identity::new("Spacing xl").camel_case(), "spacingXL");
        assert_eq!(Identity::new("body xxl bold").camel_case(), "bodyXXLBold");
    }

    #[test]
    fn test_case_transitions_split_words() {
        let id = Identity::new("primaryBlue");
        assert_eq!(id.words(), &["primary", "Blue"]);
        assert_eq!(id.snake_case(), "primary_blue");

        let id = Identity::new("grey100Dark");
        assert_eq!(id.words(), &["grey100", "Dark"]);
    }

    #[test]
    fn test_uppercase_run_stays_together() {
        let id = Identity::new("HTTP status");
        assert_eq!(id.words(), &["HTTP", "status"]);
        assert_eq!(id.camel_case(), "httpStatus");
        assert_eq!(id.kebab_case(), "http-status");
    }

    #[test]
    fn test_single_capital_before_word() {
        let id = Identity::new("titleMRegular");
        assert_eq!(id.words(), &["title", "M", "Regular"]);
        assert_eq!(id.camel_case(), "titleMRegular");

        let id = Identity::new("HTTPStatus");
        assert_eq!(id.words(), &["HTTP", "Status"]);
        assert_eq!(id.snake_case(), "http_status");
    }

    #[test]
    fn test_casings_follow_words() {
        let names = [
            "",
            "Primary",
            "  padded  name ",
            "Title M Regular",
            "titleMRegular",
            "HTTPStatus code",
            "grey100Dark",
            "brand__primary--dark / 50%",
            "Café Crème",
            "x",
            "ALL CAPS",
            "9 lives",
            "a-b_c.d e",
        ];
        for name in names {
            let id = Identity::new(name);
            assert_eq!(id.raw(), name);

            let words = id.words();
            let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            assert_eq!(id.snake_case(), lower.join("_"), "snake case of {name:?}");
            assert_eq!(id.kebab_case(), lower.join("-"), "kebab case of {name:?}");

            // Same words, same casings, whatever the separators were
            let rebuilt = Identity::new(words.join(" "));
            assert_eq!(rebuilt.words(), words, "words of {name:?}");
            assert_eq!(rebuilt.projections(), id.projections(), "projections of {name:?}");

            assert!(words.iter().all(|w| w.chars().all(char::is_alphanumeric)));
            assert_eq!(id.pascal_case().to_lowercase(), id.camel_case().to_lowercase());
        }
    }

    #[test]
    fn test_separator_runs_collapse() {
        let id = Identity::new("brand__primary--dark / 50%");
        assert_eq!(id.snake_case(), "brand_primary_dark_50");
        assert_eq!(id.camel_case(), "brandPrimaryDark50");
    }

    #[test]
    fn test_capitalize_lowercases_tail() {
        assert_eq!(Identity::new("red ALERT").camel_case(), "redAlert");
    }

    #[test]
    fn test_unicode_letters() {
        let id = Identity::new("Café Crème");
        assert_eq!(id.camel_case(), "caféCrème");
        assert_eq!(id.snake_case(), "café_crème");
    }

    #[test]
    fn test_render_matches_projections() {
        let id = Identity::new("Heading Large");
        assert_eq!(id.render(IdentityStyle::Camel), id.camel_case());
        assert_eq!(id.render(IdentityStyle::Snake), id.snake_case());
        assert_eq!(id.render(IdentityStyle::Kebab), id.kebab_case());
        assert_eq!(id.render(IdentityStyle::Pascal), id.pascal_case());
        assert_eq!(Identity::new("Heading Large"), id);
    }

    #[test]
    fn test_style_suffixes() {
        assert_eq!(IdentityStyle::from_suffix("snakecase"), Some(IdentityStyle::Snake));
        assert_eq!(IdentityStyle::from_suffix("pascalcase"), Some(IdentityStyle::Pascal));
        assert_eq!(IdentityStyle::from_suffix("titlecase"), None);
        assert_eq!(IdentityStyle::default(), IdentityStyle::Camel);
    }
}
