//! Filtering pages by metadata predicates
//!
//! Predicates follow the `field__operator=value` convention. Unlike most
//! query languages, predicates given together are joined with OR; chain
//! several filter calls to AND them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::content::{Page, Value};
use crate::error::{Error, Result};

/// Comparison applied between a page field and a predicate value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Field equals the value
    Exact,
    /// Whether the field is absent or null equals the boolean value
    IsNull,
    /// Value is a member of the field
    Contains,
    /// Field is a member of the value
    In,
    /// Case-insensitive string equality
    IExact,
    /// Case-insensitive substring of a string field, or member of a list of strings
    IContains,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Exact,
        Operator::IsNull,
        Operator::Contains,
        Operator::In,
        Operator::IExact,
        Operator::IContains,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Exact => "exact",
            Operator::IsNull => "isnull",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::IExact => "iexact",
            Operator::IContains => "icontains",
        }
    }

    /// Evaluate the operator; `field` is null when the page lacks it
    pub fn apply(&self, field: &Value, value: &Value) -> bool {
        match self {
            Operator::Exact => field == value,
            Operator::IsNull => match value {
                Value::Bool(b) => field.is_null() == *b,
                Value::Int(i) => i64::from(field.is_null()) == *i,
                _ => false,
            },
            // empty fields and values hold nothing, not even the empty string
            Operator::Contains => field.is_truthy() && field.contains(value),
            Operator::In => value.is_truthy() && value.contains(field),
            Operator::IExact => match (field.as_str(), value.as_str()) {
                (Some(f), Some(v)) => f.to_lowercase() == v.to_lowercase(),
                _ => false,
            },
            Operator::IContains => {
                let Some(needle) = value.as_str().map(str::to_lowercase) else {
                    return false;
                };
                match field {
                    Value::String(s) => s.to_lowercase().contains(&needle),
                    Value::Sequence(items) => {
                        for item in items {
                            match item.as_str() {
                                Some(s) if s.to_lowercase() == needle => return true,
                                Some(_) => continue,
                                None => return false,
                            }
                        }
                        false
                    }
                    _ => false,
                }
            }
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(Operator::Exact),
            "isnull" => Ok(Operator::IsNull),
            "contains" => Ok(Operator::Contains),
            "in" | "in_" => Ok(Operator::In),
            "iexact" => Ok(Operator::IExact),
            "icontains" => Ok(Operator::IContains),
            _ => Err(Error::UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `(field, operator, value)` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Build a predicate from a `field__operator` key
    ///
    /// The key is split on the first `__`; without it the operator is `exact`.
    pub fn parse(key: &str, value: impl Into<Value>) -> Result<Self> {
        let (field, operator) = match key.split_once("__") {
            Some((field, operator)) => (field, operator.parse()?),
            None => (key, Operator::Exact),
        };
        Ok(Self::new(field, operator, value))
    }

    pub fn matches(&self, page: &Page) -> bool {
        self.operator.apply(page.field(&self.field), &self.value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}={}", self.field, self.operator, self.value)
    }
}

/// Parse several `field__operator` / value pairs
pub fn predicates<I, K, V>(pairs: I) -> Result<Vec<Predicate>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| Predicate::parse(key.as_ref(), value))
        .collect()
}

/// Pages matching any predicate, in input order, each page at most once
///
/// With `negate`, every predicate is negated on its own before the results
/// are OR-ed together.
pub fn filter(pages: &[Arc<Page>], negate: bool, predicates: &[Predicate]) -> Vec<Arc<Page>> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .filter(|page| {
            predicates.iter().any(|p| p.matches(page) != negate) && seen.insert(Arc::as_ptr(page))
        })
        .cloned()
        .collect()
}
