//! Configuration module

mod encoding;
mod options;
mod settings;

pub use encoding::Encoding;
pub use options::Options;
pub use settings::{AutoReload, Config, CONFIG_FILE};
