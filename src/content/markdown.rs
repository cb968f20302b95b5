//! Markdown rendering with class-based syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::render::HtmlRenderer;
use crate::error::{Error, Result};

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
}

/// Extension that turns on highlighting of fenced code blocks
pub const CODEHILITE: &str = "codehilite";

/// Markdown renderer, the default [`HtmlRenderer`]
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    highlight: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with highlighting and nothing else enabled
    pub fn new() -> Self {
        Self {
            options: Options::empty(),
            highlight: true,
        }
    }

    /// Create a renderer from extension names
    ///
    /// Known names: `codehilite`, `tables`, `footnotes`, `strikethrough`,
    /// `tasklists`, `smart_punctuation`, `heading_attributes`.
    pub fn with_extensions<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let mut renderer = Self {
            options: Options::empty(),
            highlight: false,
        };

        for name in extensions {
            match name.as_ref() {
                CODEHILITE => renderer.highlight = true,
                "tables" => renderer.options |= Options::ENABLE_TABLES,
                "footnotes" => renderer.options |= Options::ENABLE_FOOTNOTES,
                "strikethrough" => renderer.options |= Options::ENABLE_STRIKETHROUGH,
                "tasklists" => renderer.options |= Options::ENABLE_TASKLISTS,
                "smart_punctuation" => renderer.options |= Options::ENABLE_SMART_PUNCTUATION,
                "heading_attributes" => renderer.options |= Options::ENABLE_HEADING_ATTRIBUTES,
                other => {
                    return Err(Error::Configuration(format!(
                        "unknown markdown extension '{}'",
                        other
                    )))
                }
            }
        }

        Ok(renderer)
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events: Vec<Event> = Vec::new();
        // (language, source) of the fenced block being collected
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) if self.highlight => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            lang.split_whitespace().next().map(str::to_string)
                        }
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => match code_block.take() {
                    Some((lang, source)) => {
                        let highlighted = highlight_code(&source, lang.as_deref());
                        events.push(Event::Html(highlighted.into()));
                    }
                    None => events.push(Event::End(TagEnd::CodeBlock)),
                },
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, source)) => source.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer for MarkdownRenderer {
    fn render(&self, text: &str) -> String {
        MarkdownRenderer::render(self, text)
    }
}

/// Highlight a code block into a `codehilite` wrapper
fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let syntax = lang
        .and_then(|l| {
            SYNTAX_SET
                .find_syntax_by_token(l)
                .or_else(|| SYNTAX_SET.find_syntax_by_extension(l))
        })
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let class = lang.map(|l| format!(r#" class="language-{}""#, html_escape(l))).unwrap_or_default();

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!("Highlighting failed, falling back to plain code: {}", e);
            return format!(
                r#"<div class="codehilite"><pre><code{}>{}</code></pre></div>"#,
                class,
                html_escape(code)
            );
        }
    }

    format!(
        r#"<div class="codehilite"><pre><code{}>{}</code></pre></div>"#,
        class,
        generator.finalize()
    )
}

/// CSS rules for the highlighter classes, in the given syntect theme
pub fn style_defs(style: &str) -> Result<String> {
    let theme = THEME_SET
        .themes
        .get(style)
        .ok_or_else(|| Error::UnknownStyle(style.to_string()))?;

    css_for_theme_with_class_style(theme, ClassStyle::Spaced)
        .map_err(|e| Error::Configuration(format!("cannot build CSS for '{}': {}", style, e)))
}

/// Names of the bundled highlight styles
pub fn style_names() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(String::as_str).collect()
}

/// Escape text for HTML element content and attribute values
pub(crate) fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_opt_in() {
        let plain = MarkdownRenderer::new();
        assert_eq!(plain.render("~~gone~~").trim(), "<p>~~gone~~</p>");

        let struck = MarkdownRenderer::with_extensions(&["strikethrough"]).unwrap();
        assert_eq!(struck.render("~~gone~~").trim(), "<p><del>gone</del></p>");
    }

    #[test]
    fn test_escape_language_name() {
        let html = MarkdownRenderer::new().render("```a\"b\nx\n```");
        assert!(html.contains(r#"class="language-a&quot;b""#));
        assert_eq!(html_escape("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<div class="codehilite">"#));
        assert!(html.contains("language-rust"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_code_block_without_highlighting() {
        let renderer = MarkdownRenderer::with_extensions::<&str>(&[]).unwrap();
        let html = renderer.render("```\na < b\n```");
        assert!(!html.contains("codehilite"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_tables_extension() {
        let renderer = MarkdownRenderer::with_extensions(&["tables"]).unwrap();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_unknown_extension() {
        let err = MarkdownRenderer::with_extensions(&["toc"]).unwrap_err();
        assert!(err.to_string().contains("toc"));
    }

    #[test]
    fn test_style_defs() {
        let css = style_defs("InspiredGitHub").unwrap();
        assert!(css.contains('{'));
        assert!(style_names().contains(&"InspiredGitHub"));

        let err = style_defs("no-such-style").unwrap_err();
        assert!(matches!(err, Error::UnknownStyle(_)));
    }
}
