//! Export highlight CSS

use anyhow::{Context, Result};

use crate::content::{style_defs, style_names};
use crate::Site;

/// Print the CSS for `style`, or for the configured style
pub fn run(site: &Site, style: Option<&str>) -> Result<()> {
    let style = style.unwrap_or(&site.config.highlight_style);
    let css = style_defs(style).with_context(|| {
        format!("available styles: {}", style_names().join(", "))
    })?;
    println!("{}", css);
    Ok(())
}
