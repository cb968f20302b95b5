//! List pages, optionally filtered and ordered

use anyhow::{Context, Result};

use crate::content::Value;
use crate::query::{predicates, PageList};
use crate::Site;

/// What to list and how
#[derive(Debug, Default)]
pub struct ListOptions {
    /// Field to order by, `-field` for descending
    pub order_by: Option<String>,
    /// `key=value` pairs; a page is kept if any matches
    pub filters: Vec<String>,
    /// `key=value` pairs; a page is dropped unless it fails all of them
    pub excludes: Vec<String>,
    pub json: bool,
}

/// Print the pages of a site
pub fn run(site: &Site, options: &ListOptions) -> Result<()> {
    let pages = query(site, options)?;
    print!("{}", render(&pages, options.json)?);
    Ok(())
}

/// Apply filters, then excludes, then ordering
pub fn query(site: &Site, options: &ListOptions) -> Result<PageList> {
    let mut pages = site.pages.all()?;

    if !options.filters.is_empty() {
        let preds = predicates(parse_pairs(&options.filters)?)?;
        pages = pages.filter(&preds);
    }
    if !options.excludes.is_empty() {
        let preds = predicates(parse_pairs(&options.excludes)?)?;
        pages = pages.exclude(&preds);
    }
    if let Some(key) = &options.order_by {
        pages = pages.order_by(key)?;
    }

    Ok(pages)
}

/// Split `key=value` arguments, reading each value as a YAML scalar
fn parse_pairs(args: &[String]) -> Result<Vec<(String, Value)>> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .with_context(|| format!("expected KEY=VALUE, got '{}'", arg))?;
            let value = Value::parse(value)
                .with_context(|| format!("invalid value in '{}'", arg))?;
            Ok((key.to_string(), value))
        })
        .collect()
}

fn render(pages: &PageList, json: bool) -> Result<String> {
    if json {
        let items: Vec<_> = pages
            .iter()
            .map(|page| serde_json::json!({ "path": page.path(), "meta": page.meta() }))
            .collect();
        return Ok(serde_json::to_string_pretty(&items)? + "\n");
    }

    let mut out = format!("Pages ({}):\n", pages.len());
    for page in pages {
        match page.get("title") {
            Some(title) => out.push_str(&format!("  {} - {}\n", page.path(), title)),
            None => out.push_str(&format!("  {}\n", page.path())),
        }
    }
    Ok(out)
}
