//! Front-matter parsing

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Line that opens and closes the YAML header block
const DELIMITER: &str = "---";

/// Errors produced while splitting a document into header and body
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("header block opened with '---' but never closed")]
    Unclosed,

    #[error("invalid YAML in header block: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Custom deserializer that accepts any YAML scalar and keeps it as a string.
/// Empty strings are treated as absent.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let value = value.trim();
            if value.is_empty() {
                Ok(None)
            } else {
                Ok(Some(value.to_string()))
            }
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Metadata header of a notice document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub status: Option<String>,
}

impl FrontMatter {
    /// Split a document into its front-matter and markdown body.
    ///
    /// Documents without an opening `---` line have empty metadata and are
    /// returned verbatim as the body.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(header_start) = strip_delimiter_line(content) else {
            return Ok((FrontMatter::default(), content));
        };

        let rest = &content[header_start..];
        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if is_delimiter(line) {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return Ok((Self::parse_yaml(yaml)?, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unclosed)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, FrontMatterError> {
        // An empty header block carries no metadata
        if yaml.trim().is_empty() {
            return Ok(FrontMatter::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// If the document opens with a delimiter line, returns the byte offset just
/// past it
fn strip_delimiter_line(content: &str) -> Option<usize> {
    let first = content.split_inclusive('\n').next()?;
    is_delimiter(first).then_some(first.len())
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}
