//! Query module - ordering and filtering over page sequences

mod filter;
mod order;

use std::ops::Deref;
use std::sync::Arc;

use crate::content::Page;
use crate::error::Result;

pub use filter::{filter, predicates, Operator, Predicate};
pub use order::{order_by, MIN_DATE};

/// A sequence of pages that can be ordered and filtered
///
/// Every operation returns a new list; the pages themselves are shared.
#[derive(Debug, Clone, Default)]
pub struct PageList(Vec<Arc<Page>>);

impl PageList {
    /// Pages sorted by a metadata field, `-field` for descending
    pub fn order_by(&self, key: &str) -> Result<PageList> {
        order_by(&self.0, key).map(PageList)
    }

    /// Pages matching any of the predicates
    pub fn filter(&self, predicates: &[Predicate]) -> PageList {
        PageList(filter(&self.0, false, predicates))
    }

    /// Pages failing any of the predicates
    pub fn exclude(&self, predicates: &[Predicate]) -> PageList {
        PageList(filter(&self.0, true, predicates))
    }
}

impl Deref for PageList {
    type Target = [Arc<Page>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Arc<Page>>> for PageList {
    fn from(pages: Vec<Arc<Page>>) -> Self {
        Self(pages)
    }
}

impl FromIterator<Arc<Page>> for PageList {
    fn from_iter<I: IntoIterator<Item = Arc<Page>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PageList {
    type Item = Arc<Page>;
    type IntoIter = std::vec::IntoIter<Arc<Page>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageList {
    type Item = &'a Arc<Page>;
    type IntoIter = std::slice::Iter<'a, Arc<Page>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Renderers;

    fn list() -> PageList {
        ["title: B\ndate: 2020-01-02", "title: A\ndate: 2020-01-01", "title: C"]
            .iter()
            .enumerate()
            .map(|(i, meta)| {
                let text = format!("{}\n\nbody", meta);
                Arc::new(Page::parse(&format!("p{}", i), &text, Renderers::default()).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_chaining_filters_ands_them() {
        let pages = list();
        let dated = predicates([("date__isnull", false)]).unwrap();
        let not_a = predicates([("title", "A")]).unwrap();

        let result = pages.filter(&dated).exclude(&not_a);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path(), "p0");
    }

    #[test]
    fn test_filter_then_order() {
        let pages = list();
        let dated = predicates([("date__isnull", false)]).unwrap();
        let ordered = pages.filter(&dated).order_by("date").unwrap();

        let paths: Vec<_> = ordered.iter().map(|p| p.path()).collect();
        assert_eq!(paths, vec!["p1", "p0"]);
    }
}
