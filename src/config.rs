use dicom_core::Tag;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

static TAG_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("'{0}' is not a valid tag identifier, expected 'gggg|eeee'")]
pub struct TagKeyError(String);

/// Parse a canonical `gggg|eeee` tag identifier into a [`Tag`].
///
/// Only the canonical form is accepted: exactly two groups of four hex
/// digits joined by a pipe. No shorter forms and no surrounding whitespace.
pub fn parse_tag_key(key: &str) -> Result<Tag, TagKeyError> {
    let regex =
        TAG_KEY_REGEX.get_or_init(|| Regex::new(r"^([0-9A-Fa-f]{4})\|([0-9A-Fa-f]{4})$").unwrap());

    let captures = regex.captures(key).ok_or_else(|| TagKeyError(key.into()))?;
    let group = u16::from_str_radix(&captures[1], 16).map_err(|_| TagKeyError(key.into()))?;
    let element = u16::from_str_radix(&captures[2], 16).map_err(|_| TagKeyError(key.into()))?;
    Ok(Tag(group, element))
}

/// Format a [`Tag`] in the canonical `gggg|eeee` form used by configuration
/// files and dump output.
pub fn format_tag_key(tag: Tag) -> String {
    format!("{:04x}|{:04x}", tag.group(), tag.element())
}

fn coerce_value(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        // Nested arrays and objects are stringified to their compact JSON
        // text rather than rejected.
        other => other.to_string(),
    }
}

/// The set of tag overwrites that defines what "redact" means for one run.
///
/// Loaded once from a flat JSON object whose member names are canonical
/// `gggg|eeee` tag identifiers and whose member values become the
/// replacement strings. The map is immutable after loading and is shared
/// by reference across every dataset touched during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionMap(BTreeMap<Tag, String>);

impl<'de> Deserialize<'de> for RedactionMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let members: BTreeMap<String, JsonValue> = BTreeMap::deserialize(deserializer)?;

        let mut map = BTreeMap::new();
        for (key, value) in members {
            let tag = parse_tag_key(&key).map_err(serde::de::Error::custom)?;
            // Last write wins for duplicate members, same as the map itself.
            map.insert(tag, coerce_value(value));
        }
        Ok(RedactionMap(map))
    }
}

impl RedactionMap {
    pub fn new() -> Self {
        RedactionMap(BTreeMap::new())
    }

    /// Load a redaction map from a JSON file.
    ///
    /// Fails when the file cannot be opened, is not valid JSON, is not a
    /// top-level object, or contains a member name that is not a canonical
    /// tag identifier. An empty object yields an empty map.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn insert(&mut self, tag: Tag, value: impl Into<String>) -> Option<String> {
        self.0.insert(tag, value.into())
    }

    pub fn get(&self, tag: &Tag) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &str)> {
        self.0.iter().map(|(tag, value)| (tag, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
