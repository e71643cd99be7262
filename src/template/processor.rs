//! The recursive line processor - expands blocks and substitutes tokens
//!
//! A template is split into an immutable array of lines once. Block bodies
//! are rendered by recursing into sub-slices of that array, carrying the
//! template line of the slice's first element for error reporting.

use std::slice;
use std::sync::LazyLock;

use regex::Regex;

use crate::assets::AssetBundle;
use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::transform::{split_pipes, Pipeline, TransformError};

use super::block::{self, Block, BlockBody, Keyword};
use super::token::{Binding, ResolveError, Token};

/// Maximum nesting of blocks, counting each inline segment as a level
pub const MAX_DEPTH: usize = 64;

/// A `{{% ... %}}` token occurrence; captures its content
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{%(.*?)%\}\}").expect("Invalid token pattern"));

/// Renders templates against an asset bundle
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    bundle: &'a AssetBundle,
    config: &'a EngineConfig,
}

impl<'a> Engine<'a> {
    pub fn new(bundle: &'a AssetBundle, config: &'a EngineConfig) -> Self {
        Self { bundle, config }
    }

    /// Render `template`, returning the generated text.
    ///
    /// Rendering is all-or-nothing: any error aborts the whole template.
    pub fn parse(&self, template: &str) -> Result<String, ParseError> {
        tracing::debug!(
            colors = self.bundle.colors.len(),
            text_styles = self.bundle.text_styles.len(),
            "Rendering template"
        );

        let prohibited = self.config.prohibited_identities(self.bundle);
        if !prohibited.is_empty() {
            tracing::warn!(identities = ?prohibited, "Assets produce reserved identities");
            return Err(ParseError::ProhibitedIdentities {
                identities: prohibited,
            });
        }

        let lines: Vec<&str> = template.split('\n').collect();
        let output = self.render_lines(&lines, 0, Binding::None, 0)?;
        Ok(output.join("\n"))
    }

    /// Render a window of lines; `offset` is the template line of `lines[0]`
    fn render_lines(
        &self,
        lines: &[&str],
        offset: usize,
        binding: Binding<'a>,
        depth: usize,
    ) -> Result<Vec<String>, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep {
                max_depth: MAX_DEPTH,
                line: offset,
            });
        }

        let mut output = Vec::new();
        let mut index = 0;
        while index < lines.len() {
            let line = lines[index];
            let line_no = offset + index;

            let detected = match block::first_opener(line) {
                Some(keyword) => block::detect(keyword, None, lines, index, offset)?,
                None => None,
            };

            match detected {
                Some(block) => match block.body.clone() {
                    BlockBody::Lines(range) => {
                        let body = &lines[range.clone()];
                        let body_offset = offset + range.start;
                        match block.keyword {
                            Keyword::For => {
                                self.render_loop(&block, body, body_offset, line_no, depth, &mut output)?
                            }
                            Keyword::If => self.render_conditional(
                                &block,
                                body,
                                body_offset,
                                line_no,
                                binding,
                                depth,
                                &mut output,
                            )?,
                        }
                        index = block.end_line_index + 1;
                    }
                    BlockBody::Inline(_) => {
                        if let Some(text) = self.render_inline(block, line_no, binding, depth)? {
                            output.push(text);
                        }
                        index += 1;
                    }
                },
                None => {
                    output.push(self.render_tokens(line, line_no, binding)?);
                    index += 1;
                }
            }
        }
        Ok(output)
    }

    /// Render the text between inline markers as its own window
    fn render_fragment(
        &self,
        text: &str,
        line_no: usize,
        binding: Binding<'a>,
        depth: usize,
    ) -> Result<String, ParseError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let rendered = self.render_lines(slice::from_ref(&text), line_no, binding, depth)?;
        Ok(rendered.concat())
    }

    /// Render a line holding one or more inline blocks, starting at `first`.
    ///
    /// Sibling blocks are walked left to right at the line's own depth; only
    /// their bodies nest. A false inline `IF` drops the whole line.
    fn render_inline(
        &self,
        first: Block<'_>,
        line_no: usize,
        binding: Binding<'a>,
        depth: usize,
    ) -> Result<Option<String>, ParseError> {
        let mut out = String::new();
        let mut next = Some(first);

        while let Some(block) = next {
            out.push_str(&self.render_tokens(block.pre_body, line_no, binding)?);

            let body = match &block.body {
                BlockBody::Inline(text) => *text,
                BlockBody::Lines(_) => return Ok(None),
            };
            match block.keyword {
                Keyword::For => {
                    for item in self.loop_bindings(&block, line_no)? {
                        out.push_str(&self.render_fragment(body, line_no, item, depth + 1)?);
                    }
                }
                Keyword::If => {
                    if !self.is_present(block.identifier, line_no, binding)? {
                        return Ok(None);
                    }
                    out.push_str(&self.render_fragment(body, line_no, binding, depth + 1)?);
                }
            }

            let rest = block.post_body;
            next = match block::first_opener(rest) {
                Some(keyword) => block::detect(keyword, None, slice::from_ref(&rest), 0, line_no)?,
                None => None,
            };
            if next.is_none() {
                out.push_str(&self.render_tokens(rest, line_no, binding)?);
            }
        }
        Ok(Some(out))
    }

    /// The bindings a `FOR` block iterates, sorted by asset name
    fn loop_bindings(&self, block: &Block<'_>, line_no: usize) -> Result<Vec<Binding<'a>>, ParseError> {
        let bindings: Vec<Binding<'a>> = match block.identifier {
            "color" => {
                let mut colors: Vec<_> = self.bundle.colors.iter().collect();
                colors.sort_by(|a, b| a.name.cmp(&b.name));
                colors.into_iter().map(Binding::Color).collect()
            }
            "textStyle" => {
                let mut styles: Vec<_> = self.bundle.text_styles.iter().collect();
                styles.sort_by(|a, b| a.name.cmp(&b.name));
                styles.into_iter().map(Binding::TextStyle).collect()
            }
            other => {
                return Err(ParseError::UnknownLoop {
                    identifier: other.to_string(),
                    line: line_no,
                })
            }
        };
        tracing::trace!(identifier = block.identifier, iterations = bindings.len(), line = line_no, "Expanding loop");
        Ok(bindings)
    }

    /// Expand a multi-line `FOR` block whose body starts at template line `offset`
    fn render_loop(
        &self,
        block: &Block<'_>,
        body: &[&str],
        offset: usize,
        line_no: usize,
        depth: usize,
        output: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        for item in self.loop_bindings(block, line_no)? {
            let mut rendered = self.render_lines(body, offset, item, depth + 1)?;
            if rendered.last().is_some_and(|last| last.is_empty()) {
                rendered.pop();
            }
            output.extend(rendered);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_conditional(
        &self,
        block: &Block<'_>,
        body: &[&str],
        offset: usize,
        line_no: usize,
        binding: Binding<'a>,
        depth: usize,
        output: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        if self.is_present(block.identifier, line_no, binding)? {
            output.extend(self.render_lines(body, offset, binding, depth + 1)?);
        }
        Ok(())
    }

    /// Whether the condition path resolves to a non-empty value.
    ///
    /// A text style without a matching color counts as absent here, so
    /// templates can guard `textStyle.color.*` references.
    fn is_present(&self, path: &str, line_no: usize, binding: Binding<'a>) -> Result<bool, ParseError> {
        let path = path.trim().to_lowercase();
        let present = match Token::resolve(&path, binding, &self.bundle.colors) {
            Ok(token) => token.render().is_some_and(|value| !value.is_empty()),
            Err(ResolveError::MissingColorForTextStyle { .. }) => false,
            Err(err) => return Err(resolve_error(err, line_no)),
        };
        tracing::trace!(condition = %path, present, line = line_no, "Evaluating conditional");
        Ok(present)
    }

    /// Substitute every token on `line`
    fn render_tokens(&self, line: &str, line_no: usize, binding: Binding<'a>) -> Result<String, ParseError> {
        if !line.contains("{{%") {
            return Ok(line.to_string());
        }

        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for caps in TOKEN.captures_iter(line) {
            let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&line[last..whole.start()]);
            out.push_str(&self.render_token(content.as_str(), line_no, binding)?);
            last = whole.end();
        }
        out.push_str(&line[last..]);
        Ok(out)
    }

    /// Resolve one token's content, e.g. `color.identity|uppercase`
    fn render_token(&self, content: &str, line_no: usize, binding: Binding<'a>) -> Result<String, ParseError> {
        let mut segments = split_pipes(content).into_iter();
        let path = segments.next().unwrap_or_default().trim().to_lowercase();

        let token = Token::resolve(&path, binding, &self.bundle.colors).map_err(|err| resolve_error(err, line_no))?;
        let pipeline = Pipeline::parse(segments).map_err(|err| transform_error(err, line_no))?;

        let value = token.render().unwrap_or_default();
        Ok(pipeline.apply(&value))
    }
}

fn resolve_error(err: ResolveError, line: usize) -> ParseError {
    match err {
        ResolveError::UnknownToken { path } => ParseError::UnknownToken { path, line },
        ResolveError::MissingColorForTextStyle { text_style } => {
            ParseError::MissingColorForTextStyle { text_style, line }
        }
    }
}

fn transform_error(err: TransformError, line: usize) -> ParseError {
    match err {
        TransformError::Unknown { spec } => ParseError::UnknownTransformation { spec, line },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Color, Rgba, TextStyle};
    use pretty_assertions::assert_eq;

    fn bundle() -> AssetBundle {
        AssetBundle::new()
            .with_colors(vec![
                Color::new("Secondary", 0, 255, 0, 1.0),
                Color::new("Primary", 255, 0, 0, 1.0),
            ])
            .with_text_styles(vec![
                TextStyle::new("Title", "Inter", "Inter-Bold", 24.0, 700.0)
                    .with_alignment("center")
                    .with_color(Rgba::new(255, 0, 0, 1.0)),
                TextStyle::new("Body", "Inter", "Inter-Regular", 14.0, 400.0),
            ])
    }

    fn render(template: &str) -> Result<String, ParseError> {
        let bundle = bundle();
        let config = EngineConfig::default();
        Engine::new(&bundle, &config).parse(template)
    }

    #[test]
    fn test_plain_text_unchanged() {
        for template in ["", "hello", "a\nb\n", "\n\n", "  indented\r\nline"] {
            assert_eq!(render(template).as_deref(), Ok(template));
        }
    }

    #[test]
    fn test_loop_sorted_by_name() {
        let out = render("{{% FOR color %}}\n{{%color.identity%}} = {{%color.rgb%}}\n{{% END color %}}").unwrap();
        assert_eq!(out, "primary = #ff0000\nsecondary = #00ff00");
    }

    #[test]
    fn test_loop_trims_one_trailing_empty_line_per_iteration() {
        let out = render("{{% FOR color %}}\n{{%color.r%}}\n\n\n{{% END color %}}\nend").unwrap();
        assert_eq!(out, "255\n\n0\n\nend");
    }

    #[test]
    fn test_loop_over_empty_collection() {
        let bundle = AssetBundle::new();
        let config = EngineConfig::default();
        let out = Engine::new(&bundle, &config)
            .parse("a\n{{% FOR color %}}\n{{%color.r%}}\n{{% END color %}}\nb")
            .unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_unknown_loop() {
        let err = render("x\n{{% FOR spacing %}}\n{{% END spacing %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownLoop {
                identifier: "spacing".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_unterminated_loop() {
        let err = render("{{% FOR color %}}\n{{%color.r%}}").unwrap_err();
        assert!(matches!(
            err,
            ParseError::OpenBlock { keyword: Keyword::For, ref identifier, line: 0 } if identifier == "color"
        ));
    }

    #[test]
    fn test_multiline_conditional() {
        let template = "{{% FOR textStyle %}}\n{{%textStyle.identity%}}\n{{% IF textStyle.alignment %}}\n  align {{%textStyle.alignment%}}\n{{% ENDIF %}}\n{{% END textStyle %}}";
        assert_eq!(render(template).unwrap(), "body\ntitle\n  align center");
    }

    #[test]
    fn test_inline_conditional() {
        let template = "{{% FOR textStyle %}}\n{{%textStyle.identity%}}{{% IF textStyle.alignment %}}: {{%textStyle.alignment|uppercase%}}{{% ENDIF %}};\n{{% END textStyle %}}";
        assert_eq!(render(template).unwrap(), "title: CENTER;");
    }

    #[test]
    fn test_inline_loop() {
        let out = render("[{{% FOR color %}}{{%color.g%}},{{% END color %}}]").unwrap();
        assert_eq!(out, "[0,255,]");
    }

    #[test]
    fn test_line_numbers_inside_bodies() {
        let err = render("a\n{{% FOR color %}}\nok\n{{%color.nope%}}\n{{% END color %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownToken {
                path: "color.nope".to_string(),
                line: 3
            }
        );
    }

    #[test]
    fn test_token_outside_loop_is_unknown() {
        assert!(matches!(
            render("{{%color.r%}}"),
            Err(ParseError::UnknownToken { line: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_transformation() {
        let err = render("{{% FOR color %}}\n{{%color.r|reverse%}}\n{{% END color %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownTransformation {
                spec: "reverse".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn test_missing_color_guarded_by_condition() {
        let template = "{{% FOR textStyle %}}\n{{% IF textStyle.color.identity %}}\n{{%textStyle.identity%}}: {{%textStyle.color.identity%}}\n{{% ENDIF %}}\n{{% END textStyle %}}";
        assert_eq!(render(template).unwrap(), "title: primary");
    }

    #[test]
    fn test_depth_guard() {
        let template = format!("{}x{}", "{{% IF color.r %}}".repeat(80), "{{% ENDIF %}}".repeat(80));
        let bundle = bundle();
        let config = EngineConfig::default();
        let engine = Engine::new(&bundle, &config);
        let wrapped = format!("{{{{% FOR color %}}}}\n{}\n{{{{% END color %}}}}", template);
        assert!(matches!(
            engine.parse(&wrapped),
            Err(ParseError::NestingTooDeep { max_depth: MAX_DEPTH, line: 1 })
        ));
    }

    #[test]
    fn test_sibling_inline_blocks_do_not_nest() {
        let line = "{{% IF textStyle.alignment %}}x{{% ENDIF %}},".repeat(MAX_DEPTH + 6);
        let template = format!("{{{{% FOR textStyle %}}}}\n{}\n{{{{% END textStyle %}}}}", line);
        assert_eq!(render(&template).unwrap(), "x,".repeat(MAX_DEPTH + 6));
    }

    #[test]
    fn test_sibling_inline_blocks_share_binding() {
        let template = "{{% FOR textStyle %}}\n{{%textStyle.identity%}}{{% IF textStyle.alignment %}} {{%textStyle.alignment%}}{{% ENDIF %}}/{{% IF textStyle.color.r %}}{{%textStyle.color.identity%}}{{% ENDIF %}};\n{{% END textStyle %}}";
        assert_eq!(render(template).unwrap(), "title center/primary;");
    }

    #[test]
    fn test_false_sibling_drops_whole_line() {
        let template = "{{% FOR textStyle %}}\n{{% IF textStyle.fontsize %}}{{%textStyle.identity%}}{{% ENDIF %}}:{{% IF textStyle.alignment %}}a{{% ENDIF %}}\n{{% END textStyle %}}";
        assert_eq!(render(template).unwrap(), "title:a");
    }

    #[test]
    fn test_unknown_condition_path() {
        let err = render("{{% FOR textStyle %}}\n{{% IF textStyle.bogus %}}\nx\n{{% ENDIF %}}\n{{% END textStyle %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownToken {
                path: "textstyle.bogus".to_string(),
                line: 1
            }
        );

        let err = render("{{% FOR textStyle %}}\n{{% IF textStyle.bogus %}}y{{% ENDIF %}}\n{{% END textStyle %}}").unwrap_err();
        assert!(matches!(err, ParseError::UnknownToken { line: 1, .. }));
    }

    #[test]
    fn test_unknown_color_field_of_uncolored_style() {
        // "Body" has no color; the field name is still checked first
        let err = render("{{% FOR textStyle %}}\n{{% IF textStyle.color.bogus %}}\nx\n{{% ENDIF %}}\n{{% END textStyle %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownToken {
                path: "textstyle.color.bogus".to_string(),
                line: 1
            }
        );

        let err = render("{{% FOR textStyle %}}\n{{%textStyle.color.bogus%}}\n{{% END textStyle %}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownToken {
                path: "textstyle.color.bogus".to_string(),
                line: 1
            }
        );
    }
}
