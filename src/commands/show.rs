//! Show a single page

use anyhow::Result;

use crate::content::Page;
use crate::Site;

/// Print the rendered page at `path`
pub fn run(site: &Site, path: &str, intro: bool, meta: bool) -> Result<()> {
    let page = site.pages.get_or_not_found(path)?;
    print!("{}", render(&page, intro, meta)?);
    Ok(())
}

fn render(page: &Page, intro: bool, meta: bool) -> Result<String> {
    let mut out = String::new();
    if meta {
        out.push_str(&serde_yaml::to_string(page.meta())?);
        out.push('\n');
    }
    out.push_str(if intro { page.intro() } else { page.html() });
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
