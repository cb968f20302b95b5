//! Metadata block parsing
//!
//! A page file starts with a YAML mapping, ends the mapping with the first
//! blank line and continues with the body.

use super::value::{Metadata, Value};
use crate::error::{Error, Result};

/// Split raw page text into `(metadata_block, body)`
///
/// The first line that is empty or only whitespace separates the two and
/// belongs to neither. Without such a line the whole text is metadata.
pub fn split(text: &str) -> (&str, &str) {
    let mut offset: usize = 0;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            let meta = &text[..offset.saturating_sub(1)];
            let body = text.get(offset + line.len() + 1..).unwrap_or("");
            return (meta, body);
        }
        offset += line.len() + 1;
    }
    (text, "")
}

/// Decode a metadata block into a mapping
///
/// Empty or falsy documents give an empty mapping. Anything else that is not
/// a mapping is an error naming the page.
pub fn decode(block: &str, path: &str) -> Result<Metadata> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(block).map_err(|source| Error::Yaml {
        path: path.to_string(),
        source,
    })?;

    match Value::from_yaml(yaml) {
        Value::Mapping(map) => Ok(map),
        value if !value.is_truthy() => Ok(Metadata::new()),
        value => Err(Error::MetadataType {
            path: path.to_string(),
            found: value.type_name(),
        }),
    }
}

/// Parse raw page text into its metadata and body
pub fn parse<'a>(text: &'a str, path: &str) -> Result<(Metadata, &'a str)> {
    let (block, body) = split(text);
    let meta = decode(block, path)?;
    Ok((meta, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_metadata_and_body() {
        let text = "title: Hello\ndate: 2020-01-01\n\nBody text";
        let (meta, body) = parse(text, "hello").unwrap();

        assert_eq!(meta.get("title"), Some(&Value::from("Hello")));
        assert_eq!(
            meta.get("date"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))
        );
        assert_eq!(meta.len(), 2);
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "title: Same\ntags: [a, b]\n\nline one\n\nline two\n";
        let (first_meta, first_body) = parse(text, "same").unwrap();
        let (second_meta, second_body) = parse(text, "same").unwrap();
        assert_eq!(first_meta, second_meta);
        assert_eq!(first_body, second_body);
    }

    #[test]
    fn test_no_blank_line_is_all_metadata() {
        let text = "title: Only\nauthor: Me";
        assert_eq!(split(text), (text, ""));

        let (meta, body) = parse(text, "only").unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(body, "");
    }

    #[test]
    fn test_whitespace_line_separates() {
        let (meta, body) = split("title: x\n   \t\nfirst\n\nsecond");
        assert_eq!(meta, "title: x");
        assert_eq!(body, "first\n\nsecond");
    }

    #[test]
    fn test_leading_blank_line_means_no_metadata() {
        let (meta, body) = parse("\n# Heading\n\nText", "nometa").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "# Heading\n\nText");
    }

    #[test]
    fn test_trailing_separator_gives_empty_body() {
        assert_eq!(split("title: x\n"), ("title: x", ""));
        assert_eq!(split("title: x\n\n"), ("title: x", ""));
    }

    #[test]
    fn test_empty_text() {
        let (meta, body) = parse("", "empty").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "");
    }

    #[test]
    fn test_falsy_document_is_empty_mapping() {
        assert!(decode("~", "null").unwrap().is_empty());
        assert!(decode("[]", "list").unwrap().is_empty());
    }

    #[test]
    fn test_sequence_metadata_is_type_error() {
        let err = parse("- 1\n- 2\n\nbody", "blog/list").unwrap_err();
        match err {
            Error::MetadataType { path, found } => {
                assert_eq!(path, "blog/list");
                assert_eq!(found, "sequence");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scalar_metadata_is_type_error() {
        let err = decode("just some words", "words").unwrap_err();
        assert!(err.to_string().contains("'words'"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = decode("title: [unclosed", "broken").unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
    }
}
