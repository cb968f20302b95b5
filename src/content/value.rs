//! Metadata values decoded from YAML

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Ordered metadata mapping of a page
pub type Metadata = IndexMap<String, Value>;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap();
    static ref DATETIME_RE: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[Tt]|[ \t]+)(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d*))?(?:[ \t]*(Z|([-+])(\d{1,2})(?::(\d{2}))?))?$"
    )
    .unwrap();
}

/// A single metadata value
///
/// Plain YAML scalars that look like YAML 1.1 timestamps are decoded to
/// [`Value::Date`] or [`Value::DateTime`] so that pages can be ordered by date.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    /// Timezone-aware timestamps are normalized to UTC
    DateTime(NaiveDateTime),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Convert a decoded YAML document into a metadata value
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Yaml::String(s) => parse_timestamp(&s).unwrap_or(Value::String(s)),
            Yaml::Sequence(seq) => Value::Sequence(seq.into_iter().map(Value::from_yaml).collect()),
            Yaml::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (key_to_string(k), Value::from_yaml(v)))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }

    /// Parse a single YAML scalar or flow collection, e.g. a value given on the command line
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Value::String(text.to_string()));
        }
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Value::from_yaml(yaml))
    }

    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Truthiness: null, false, zero and empty collections are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Sequence(seq) => !seq.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
            Value::Date(_) | Value::DateTime(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Membership test: `needle in self`
    ///
    /// Sequences test their elements, strings test substrings and mappings
    /// test their keys. Null behaves as an empty collection. Any other
    /// container kind contains nothing.
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Value::Sequence(seq) => seq.iter().any(|item| item == needle),
            Value::String(haystack) => needle.as_str().is_some_and(|n| haystack.contains(n)),
            Value::Mapping(map) => needle.as_str().is_some_and(|key| map.contains_key(key)),
            _ => false,
        }
    }

    /// Compare two values, `None` when their kinds cannot be ordered
    ///
    /// Integers and floats compare numerically, dates compare with datetimes
    /// as midnight, and sequences compare element by element.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::DateTime(b)) => Some(a.and_hms_opt(0, 0, 0)?.cmp(b)),
            (Value::DateTime(a), Value::Date(b)) => Some(a.cmp(&b.and_hms_opt(0, 0, 0)?)),
            (Value::Sequence(a), Value::Sequence(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Sequence(seq) => {
                f.write_str("[")?;
                for (i, item) in seq.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Mapping keys are always strings; other scalar keys are stringified
fn key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => Value::from_yaml(other).to_string(),
    }
}

/// Recognize the YAML 1.1 timestamp forms
fn parse_timestamp(s: &str) -> Option<Value> {
    if let Some(caps) = DATE_RE.captures(s) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(Value::Date(date));
    }

    let caps = DATETIME_RE.captures(s)?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;

    let nanos = match caps.get(7) {
        Some(fraction) if !fraction.as_str().is_empty() => {
            let digits: String = fraction.as_str().chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        _ => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
        nanos,
    )?;
    let mut datetime = date.and_time(time);

    if let Some(sign) = caps.get(9) {
        let hours: i64 = caps[10].parse().ok()?;
        let minutes: i64 = caps.get(11).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let offset = Duration::minutes(hours * 60 + minutes);
        datetime = if sign.as_str() == "-" {
            datetime + offset
        } else {
            datetime - offset
        };
    }

    Some(Value::DateTime(datetime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_date_scalar() {
        let value = Value::parse("2020-01-01").unwrap();
        assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()));
    }

    #[test]
    fn test_datetime_with_offset_is_utc() {
        let value = Value::parse("2024-01-15 10:30:00 +02:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(value, Value::DateTime(expected));
    }

    #[test]
    fn test_datetime_with_fraction() {
        let value = Value::parse("2001-12-14t21:59:43.10Z").unwrap();
        let expected = NaiveDate::from_ymd_opt(2001, 12, 14)
            .unwrap()
            .and_hms_milli_opt(21, 59, 43, 100)
            .unwrap();
        assert_eq!(value, Value::DateTime(expected));
    }

    #[test]
    fn test_invalid_date_stays_string() {
        let value = Value::parse("2020-13-45").unwrap();
        assert_eq!(value, Value::from("2020-13-45"));
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::from("1"));
    }

    #[test]
    fn test_compare_date_with_datetime() {
        let date = Value::parse("2020-01-02").unwrap();
        let datetime = Value::parse("2020-01-01 23:00:00").unwrap();
        assert_eq!(date.compare(&datetime), Some(Ordering::Greater));
        assert_eq!(date.compare(&Value::from("x")), None);
    }

    #[test]
    fn test_contains() {
        let tags = Value::from(vec!["rust", "yaml"]);
        assert!(tags.contains(&Value::from("rust")));
        assert!(!tags.contains(&Value::from("python")));
        assert!(Value::from("Alphabet").contains(&Value::from("pha")));
        assert!(!Value::Null.contains(&Value::from("a")));
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let value = Value::parse("{1: one, true: yes}").unwrap();
        let Value::Mapping(map) = value else {
            panic!("expected a mapping");
        };
        assert_eq!(map.get("1"), Some(&Value::from("one")));
        assert!(map.contains_key("true"));
    }
}
