//! Collection configuration (flatpages.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::content::CODEHILITE;
use crate::error::{Error, Result};

/// Name of the optional configuration file in the application root
pub const CONFIG_FILE: &str = "flatpages.yml";

/// Page collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pages directory, relative to the application root
    pub root: String,
    /// Required suffix of page files
    pub extension: String,
    pub encoding: String,

    // Rendering
    pub markdown_extensions: Vec<String>,
    pub highlight_style: String,
    /// `string` or `none`
    pub template_renderer: String,
    #[serde(default)]
    pub template_context: IndexMap<String, serde_yaml::Value>,

    pub auto_reload: AutoReload,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: "pages".to_string(),
            extension: ".html".to_string(),
            encoding: "utf-8".to_string(),

            markdown_extensions: vec![CODEHILITE.to_string()],
            highlight_style: "InspiredGitHub".to_string(),
            template_renderer: "string".to_string(),
            template_context: IndexMap::new(),

            auto_reload: AutoReload::IfDebug,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("invalid config {:?}: {}", path, e)))
    }

    /// Load `flatpages.yml` from the application root, or use the defaults
    pub fn load_from_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// When the collection is reloaded before a unit of host work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "RawAutoReload")]
pub enum AutoReload {
    Always,
    Never,
    #[default]
    IfDebug,
}

impl AutoReload {
    /// Whether to reload, given whether the host runs in debug mode
    pub fn should_reload(&self, debug: bool) -> bool {
        match self {
            AutoReload::Always => true,
            AutoReload::Never => false,
            AutoReload::IfDebug => debug,
        }
    }
}

impl FromStr for AutoReload {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "always" | "true" => Ok(AutoReload::Always),
            "never" | "false" => Ok(AutoReload::Never),
            "if-debug" => Ok(AutoReload::IfDebug),
            _ => Err(Error::Configuration(format!("invalid auto_reload '{}'", s))),
        }
    }
}

impl fmt::Display for AutoReload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AutoReload::Always => "always",
            AutoReload::Never => "never",
            AutoReload::IfDebug => "if-debug",
        })
    }
}

/// `auto_reload` as written in YAML: a boolean or a policy name
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAutoReload {
    Flag(bool),
    Name(String),
}

impl TryFrom<RawAutoReload> for AutoReload {
    type Error = Error;

    fn try_from(raw: RawAutoReload) -> Result<Self> {
        match raw {
            RawAutoReload::Flag(true) => Ok(AutoReload::Always),
            RawAutoReload::Flag(false) => Ok(AutoReload::Never),
            RawAutoReload::Name(name) => name.parse(),
        }
    }
}
