//! Resolved runtime options

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::encoding::Encoding;
use super::settings::{AutoReload, Config};
use crate::content::{
    HtmlRenderer, MarkdownRenderer, NoTemplate, Renderers, StringTemplate, TemplateContext,
    TemplateRenderer, Value,
};
use crate::error::{Error, Result};

/// Immutable options a page collection is built with
#[derive(Debug, Clone)]
pub struct Options {
    /// Absolute (or cwd-relative) pages directory
    pub root: PathBuf,
    pub extension: String,
    pub encoding: Encoding,
    pub renderers: Renderers,
    pub auto_reload: AutoReload,
}

impl Options {
    /// Defaults for a pages directory
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extension: ".html".to_string(),
            encoding: Encoding::Utf8,
            renderers: Renderers::default(),
            auto_reload: AutoReload::IfDebug,
        }
    }

    /// Resolve a configuration against the application root
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self> {
        let encoding: Encoding = config.encoding.parse()?;
        let html = MarkdownRenderer::with_extensions(&config.markdown_extensions)?;
        let template: Arc<dyn TemplateRenderer> = match config.template_renderer.as_str() {
            "string" => Arc::new(StringTemplate),
            "none" => Arc::new(NoTemplate),
            other => {
                return Err(Error::Configuration(format!(
                    "unknown template renderer '{}'",
                    other
                )))
            }
        };
        let context: TemplateContext = config
            .template_context
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_yaml(value.clone())))
            .collect();

        Ok(Self {
            root: base_dir.join(&config.root),
            extension: config.extension.clone(),
            encoding,
            renderers: Renderers {
                html: Arc::new(html),
                template,
                context: Arc::new(context),
            },
            auto_reload: config.auto_reload,
        })
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replace the body renderer
    pub fn with_html_renderer<R: HtmlRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderers.html = Arc::new(renderer);
        self
    }

    /// Replace the templating step
    pub fn with_template_renderer<R: TemplateRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderers.template = Arc::new(renderer);
        self
    }

    pub fn with_template_context(mut self, context: TemplateContext) -> Self {
        self.renderers.context = Arc::new(context);
        self
    }

    pub fn with_auto_reload(mut self, auto_reload: AutoReload) -> Self {
        self.auto_reload = auto_reload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config: Config = serde_yaml::from_str(
            "root: content\nencoding: latin-1\ntemplate_context:\n  year: 2024\n",
        )
        .unwrap();
        let options = Options::from_config(&config, Path::new("/srv/app")).unwrap();

        assert_eq!(options.root, Path::new("/srv/app/content"));
        assert_eq!(options.encoding, Encoding::Latin1);
        assert_eq!(options.renderers.context.get("year"), Some(&Value::Int(2024)));
    }

    #[test]
    fn test_from_config_rejects_bad_values() {
        let config = Config {
            encoding: "ebcdic".to_string(),
            ..Config::default()
        };
        assert!(Options::from_config(&config, Path::new(".")).is_err());

        let config = Config {
            template_renderer: "jinja".to_string(),
            ..Config::default()
        };
        let err = Options::from_config(&config, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("jinja"));
    }
}
