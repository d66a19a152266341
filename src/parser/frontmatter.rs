use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---[ \t]*\r?$").unwrap());

pub const API_NAME_FIELD: &str = "api_name";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("malformed front matter: {0}")]
    MalformedMetadata(String),
    #[error("front matter has no usable `{0}` field")]
    MissingRequiredField(&'static str),
}

/// Text between the first and second `---` lines, if both exist.
/// A leading byte-order mark is ignored.
pub fn extract_block(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let mut delimiters = DELIMITER_RE.find_iter(content);
    let open = delimiters.next()?;
    let close = delimiters.next()?;
    Some(&content[open.end()..close.start()])
}

/// Locate and parse the YAML front matter into a mapping.
pub fn parse(content: &str) -> Result<Mapping, MetadataError> {
    let block = extract_block(content).ok_or_else(|| {
        MetadataError::MalformedMetadata("missing `---` delimiter lines".to_string())
    })?;

    serde_yaml::from_str::<LastWins>(block)
        .map(|m| m.0)
        .map_err(|e| MetadataError::MalformedMetadata(e.to_string()))
}

/// Top-level mapping where a repeated key keeps its last value.
/// `Mapping`'s own impl rejects repeated keys outright.
struct LastWins(Mapping);

impl<'de> Deserialize<'de> for LastWins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LastWinsVisitor;

        impl<'de> Visitor<'de> for LastWinsVisitor {
            type Value = LastWins;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LastWins, A::Error> {
                let mut map = Mapping::new();
                while let Some((key, value)) = access.next_entry::<Value, Value>()? {
                    map.insert(key, value);
                }
                Ok(LastWins(map))
            }

            // An empty block parses as null
            fn visit_unit<E: de::Error>(self) -> Result<LastWins, E> {
                Ok(LastWins(Mapping::new()))
            }

            fn visit_none<E: de::Error>(self) -> Result<LastWins, E> {
                Ok(LastWins(Mapping::new()))
            }
        }

        deserializer.deserialize_any(LastWinsVisitor)
    }
}

/// First entry of `api_name`. A bare string counts as a one-element list.
pub fn api_name(front_matter: &Mapping) -> Result<String, MetadataError> {
    let field = front_matter
        .get(API_NAME_FIELD)
        .ok_or(MetadataError::MissingRequiredField(API_NAME_FIELD))?;

    let first = match field {
        Value::Null => return Err(MetadataError::MissingRequiredField(API_NAME_FIELD)),
        Value::Sequence(names) => names
            .first()
            .ok_or(MetadataError::MissingRequiredField(API_NAME_FIELD))?,
        other => other,
    };

    let name = match first {
        Value::String(s) => s.trim(),
        Value::Null => return Err(MetadataError::MissingRequiredField(API_NAME_FIELD)),
        other => {
            return Err(MetadataError::MalformedMetadata(format!(
                "`{}` must hold strings, found {}",
                API_NAME_FIELD,
                value_kind(other)
            )))
        }
    };

    if name.is_empty() {
        return Err(MetadataError::MissingRequiredField(API_NAME_FIELD));
    }
    Ok(name.to_string())
}

/// Parse the page and read its canonical entity name in one step.
pub fn read_api_name(content: &str) -> Result<String, MetadataError> {
    api_name(&parse(content)?)
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ── Tests ──
