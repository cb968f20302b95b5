//! Rendering strategies used by pages
//!
//! A page body goes through a [`TemplateRenderer`] first and an
//! [`HtmlRenderer`] second. Both are plain traits so callers can inject their
//! own; closures implement them too.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

use super::markdown::MarkdownRenderer;
use super::value::Metadata;

/// Variables handed to the template renderer
pub type TemplateContext = Metadata;

/// Turns (already templated) body text into HTML
pub trait HtmlRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// Pre-render templating step applied to the raw body
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, text: &str, context: &TemplateContext) -> String;
}

impl<F> HtmlRenderer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render(&self, text: &str) -> String {
        self(text)
    }
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &TemplateContext) -> String + Send + Sync,
{
    fn render(&self, text: &str, context: &TemplateContext) -> String {
        self(text, context)
    }
}

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\$(?:(\$)|([_a-zA-Z][_a-zA-Z0-9]*)|\{([_a-zA-Z][_a-zA-Z0-9]*)\})").unwrap();
}

/// `$name` / `${name}` substitution
///
/// `$$` becomes a literal `$`. Placeholders without a value in the context
/// are left untouched, so this never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTemplate;

impl TemplateRenderer for StringTemplate {
    fn render(&self, text: &str, context: &TemplateContext) -> String {
        PLACEHOLDER_RE
            .replace_all(text, |caps: &Captures| {
                if caps.get(1).is_some() {
                    return "$".to_string();
                }
                let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match context.get(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// The rendering pipeline shared by every page of a collection
#[derive(Clone)]
pub struct Renderers {
    pub html: Arc<dyn HtmlRenderer>,
    pub template: Arc<dyn TemplateRenderer>,
    pub context: Arc<TemplateContext>,
}

impl Renderers {
    /// Run the template step, then the HTML step
    pub fn render(&self, text: &str) -> String {
        let templated = self.template.render(text, &self.context);
        self.html.render(&templated)
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self {
            html: Arc::new(MarkdownRenderer::new()),
            template: Arc::new(StringTemplate),
            context: Arc::new(TemplateContext::new()),
        }
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderers")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Leaves the body as it is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTemplate;

impl TemplateRenderer for NoTemplate {
    fn render(&self, text: &str, _context: &TemplateContext) -> String {
        text.to_string()
    }
}
