//! flatpages: flat-file pages with YAML metadata
//!
//! Pages are text files below a root directory. Each file starts with an
//! optional YAML metadata block, then a blank line, then the body, which is
//! rendered to HTML on first use. The collection is built lazily, keeps
//! parsed pages across reloads, and supports ordering and filtering by
//! metadata fields.

pub mod cache;
pub mod collection;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod query;
pub mod server;

pub use collection::{FlatPages, PageMap, Pages};
pub use config::{AutoReload, Config, Encoding, Options, CONFIG_FILE};
pub use content::{Page, Value};
pub use error::{Error, Result};
pub use query::{Operator, PageList, Predicate};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An application root: configuration plus the page collection it describes
#[derive(Debug, Clone)]
pub struct Site {
    /// Loaded configuration
    pub config: Config,
    /// Base directory
    pub base_dir: PathBuf,
    /// The pages, shared with the server
    pub pages: Arc<FlatPages>,
}

impl Site {
    /// Open a site from a directory, reading `flatpages.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = Config::load_from_dir(&base_dir)?;
        let options = Options::from_config(&config, &base_dir)?;

        Ok(Self {
            config,
            base_dir,
            pages: Arc::new(FlatPages::new(options)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_site_defaults() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/about.html"), "title: About\n\n*hi*").unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.pages.root(), dir.path().join("pages"));

        let page = site.pages.get_or_not_found("about").unwrap();
        assert_eq!(page.html().trim(), "<p><em>hi</em></p>");
    }

    #[test]
    fn test_site_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "root: content\nextension: .md\ntemplate_context:\n  name: World\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/hello.md"), "\nHello $name").unwrap();
        fs::write(dir.path().join("content/skip.html"), "\nignored").unwrap();

        let site = Site::new(dir.path()).unwrap();
        let map = site.pages.pages().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["hello"].html().trim(), "<p>Hello World</p>");
    }

    #[test]
    fn test_site_bad_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "encoding: klingon\n").unwrap();
        assert!(matches!(Site::new(dir.path()), Err(Error::Configuration(_))));
    }
}
