//! Content module - pages, metadata parsing and rendering

pub mod loader;
mod markdown;
pub mod metadata;
mod page;
mod render;
mod value;

pub use loader::{DirectoryScanner, PageFile};
pub use markdown::{style_defs, style_names, MarkdownRenderer, CODEHILITE};
pub(crate) use markdown::html_escape;
pub use page::Page;
pub use render::{HtmlRenderer, NoTemplate, Renderers, StringTemplate, TemplateContext, TemplateRenderer};
pub use value::{Metadata, Value};
