//! Ordering pages by a metadata field

use chrono::NaiveDate;
use lazy_static::lazy_static;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::content::{Page, Value};
use crate::error::{Error, Result};

lazy_static! {
    /// Sort value of pages that lack the ordering field
    pub static ref MIN_DATE: NaiveDate = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
}

/// Sort a copy of `pages` by the metadata field named in `key`
///
/// A leading `-` sorts descending. The sort is stable in both directions.
/// Pages without the field sort as [`MIN_DATE`], which is below every
/// non-date value too, so they come first ascending and last descending.
pub fn order_by(pages: &[Arc<Page>], key: &str) -> Result<Vec<Arc<Page>>> {
    let (field, descending) = match key.strip_prefix('-') {
        Some(field) => (field, true),
        None => (key, false),
    };

    let mut sorted = pages.to_vec();
    let mut failure = None;

    sorted.sort_by(|a, b| {
        let (x, y) = if descending { (b, a) } else { (a, b) };
        let (x, y) = (x.get(field), y.get(field));
        compare_fields(x, y).unwrap_or_else(|| {
            failure.get_or_insert_with(|| Error::Incomparable {
                field: field.to_string(),
                left: x.map_or("missing", Value::type_name),
                right: y.map_or("missing", Value::type_name),
            });
            rank(x).cmp(&rank(y))
        })
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(sorted),
    }
}

/// Compare two field values; a null field sorts like a missing one
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    let (a, b) = (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null()));
    match (a, b) {
        (None, None) => Some(Ordering::Equal),
        (None, Some(value)) => Some(missing_against(value)),
        (Some(value), None) => Some(missing_against(value).reverse()),
        (Some(x), Some(y)) => x.compare(y),
    }
}

/// Where a missing field sorts relative to `value`
fn missing_against(value: &Value) -> Ordering {
    match value {
        Value::Date(_) | Value::DateTime(_) => Value::Date(*MIN_DATE)
            .compare(value)
            .unwrap_or(Ordering::Less),
        _ => Ordering::Less,
    }
}

/// Fallback grouping by kind, keeps the sort total after a failed comparison
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Int(_)) | Some(Value::Float(_)) => 2,
        Some(Value::Date(_)) | Some(Value::DateTime(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Sequence(_)) => 5,
        Some(Value::Mapping(_)) => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Renderers;

    fn page(path: &str, meta: &str) -> Arc<Page> {
        let text = format!("{}\n\nbody", meta);
        Arc::new(Page::parse(path, &text, Renderers::default()).unwrap())
    }

    fn paths(pages: &[Arc<Page>]) -> Vec<&str> {
        pages.iter().map(|p| p.path()).collect()
    }

    fn dated() -> Vec<Arc<Page>> {
        vec![
            page("mid", "date: 2020-06-01"),
            page("old", "date: 2019-01-01"),
            page("new", "date: 2021-03-15 08:00:00"),
        ]
    }

    #[test]
    fn test_ascending_and_descending_are_reversed() {
        let pages = dated();
        let asc = order_by(&pages, "date").unwrap();
        let desc = order_by(&pages, "-date").unwrap();

        assert_eq!(paths(&asc), vec!["old", "mid", "new"]);
        let mut reversed = paths(&desc);
        reversed.reverse();
        assert_eq!(paths(&asc), reversed);
    }

    #[test]
    fn test_missing_field_sorts_first_then_last() {
        let mut pages = dated();
        pages.insert(1, page("undated", "title: x"));

        let asc = order_by(&pages, "date").unwrap();
        assert_eq!(paths(&asc)[0], "undated");

        let desc = order_by(&pages, "-date").unwrap();
        assert_eq!(paths(&desc)[3], "undated");
    }

    #[test]
    fn test_missing_field_sorts_before_strings() {
        let pages = vec![page("b", "title: B"), page("none", "x: 1"), page("a", "title: A")];
        let sorted = order_by(&pages, "title").unwrap();
        assert_eq!(paths(&sorted), vec!["none", "a", "b"]);
    }

    #[test]
    fn test_null_field_sorts_like_missing() {
        let mut pages = dated();
        pages.push(page("blank", "date:"));

        let asc = order_by(&pages, "date").unwrap();
        assert_eq!(paths(&asc), vec!["blank", "old", "mid", "new"]);

        let desc = order_by(&pages, "-date").unwrap();
        assert_eq!(paths(&desc)[3], "blank");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let pages = vec![
            page("first", "rank: 1"),
            page("second", "rank: 1"),
            page("top", "rank: 2"),
            page("third", "rank: 1"),
        ];

        let asc = order_by(&pages, "rank").unwrap();
        assert_eq!(paths(&asc), vec!["first", "second", "third", "top"]);

        let desc = order_by(&pages, "-rank").unwrap();
        assert_eq!(paths(&desc), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_input_is_not_modified() {
        let pages = dated();
        let _ = order_by(&pages, "date").unwrap();
        assert_eq!(paths(&pages), vec!["mid", "old", "new"]);
    }

    #[test]
    fn test_incomparable_values() {
        let pages = vec![page("a", "date: 2020-01-01"), page("b", "date: soon")];
        let err = order_by(&pages, "date").unwrap_err();
        match err {
            Error::Incomparable { field, .. } => assert_eq!(field, "date"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mixed_numbers_compare() {
        let pages = vec![page("a", "w: 2.5"), page("b", "w: 1"), page("c", "w: 3")];
        let sorted = order_by(&pages, "w").unwrap();
        assert_eq!(paths(&sorted), vec!["b", "a", "c"]);
    }
}
