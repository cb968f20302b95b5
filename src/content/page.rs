//! Page model

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::metadata;
use super::render::Renderers;
use super::value::{Metadata, Value};
use crate::error::Result;

lazy_static! {
    /// Marks the end of the intro, e.g. `<!-- more -->`
    static ref MORE_RE: Regex = Regex::new(r"<!--.*more.*-->").unwrap();
}

/// A single flat page
///
/// Everything but the rendered forms is fixed at construction. `html` and
/// `intro` are rendered on first access and kept for the page's lifetime.
pub struct Page {
    path: String,
    meta: Metadata,
    body: String,
    renderers: Renderers,
    html: OnceLock<String>,
    intro: OnceLock<String>,
}

impl Page {
    /// Create a page from already parsed parts
    pub fn new(
        path: impl Into<String>,
        meta: Metadata,
        body: impl Into<String>,
        renderers: Renderers,
    ) -> Self {
        Self {
            path: path.into(),
            meta,
            body: body.into(),
            renderers,
            html: OnceLock::new(),
            intro: OnceLock::new(),
        }
    }

    /// Parse raw file text into a page
    pub fn parse(path: &str, text: &str, renderers: Renderers) -> Result<Self> {
        let (meta, body) = metadata::parse(text, path)?;
        Ok(Self::new(path, meta, body, renderers))
    }

    /// Logical path, as in `pages.get(path)`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Raw, unrendered body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Metadata field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.meta.get(name)
    }

    /// Metadata field by name, absent fields read as null
    pub fn field(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.meta.get(name).unwrap_or(&NULL)
    }

    /// The whole body, rendered
    pub fn html(&self) -> &str {
        self.html.get_or_init(|| self.renderers.render(&self.body))
    }

    /// The body up to the first "more" marker, rendered
    pub fn intro(&self) -> &str {
        self.intro.get_or_init(|| {
            let intro = MORE_RE
                .find(&self.body)
                .map_or(self.body.as_str(), |m| &self.body[..m.start()]);
            self.renderers.render(intro)
        })
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
