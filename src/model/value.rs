//! Parsed document values
//!
//! Chart value files are parsed with `serde_yaml` and folded into a small
//! tagged variant that the structure model pattern-matches on.

use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

/// Kind of a scalar leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
}

impl ScalarKind {
    /// Tag stored as the `data_type` of structure nodes
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::String => "string",
        }
    }
}

/// A parsed document: mapping, sequence or scalar
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Map(BTreeMap<String, DocValue>),
    Seq(Vec<DocValue>),
    Scalar(ScalarKind),
}

impl DocValue {
    #[must_use]
    pub const fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Tag describing the shape of this value
    #[must_use]
    pub const fn data_type(&self) -> &'static str {
        match self {
            Self::Map(_) => "mapping",
            Self::Seq(_) => "sequence",
            Self::Scalar(kind) => kind.as_str(),
        }
    }

    /// Wrap this value under `keys`, outermost key first
    #[must_use]
    pub fn nest_under(self, keys: &[String]) -> Self {
        keys.iter().rev().fold(self, |inner, key| {
            Self::Map(BTreeMap::from([(key.clone(), inner)]))
        })
    }
}

impl From<YamlValue> for DocValue {
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Null => Self::Scalar(ScalarKind::Null),
            YamlValue::Bool(_) => Self::Scalar(ScalarKind::Bool),
            YamlValue::Number(number) => {
                if number.is_f64() {
                    Self::Scalar(ScalarKind::Float)
                } else {
                    Self::Scalar(ScalarKind::Integer)
                }
            }
            YamlValue::String(_) => Self::Scalar(ScalarKind::String),
            YamlValue::Sequence(items) => Self::Seq(items.into_iter().map(Self::from).collect()),
            YamlValue::Mapping(mapping) => Self::Map(
                mapping
                    .into_iter()
                    .map(|(key, value)| (key_to_string(&key), Self::from(value)))
                    .collect(),
            ),
            YamlValue::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

/// Stringify a mapping key; non-string keys keep their YAML rendering
fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(text) => text.clone(),
        YamlValue::Bool(flag) => flag.to_string(),
        YamlValue::Number(number) => number.to_string(),
        YamlValue::Null => "null".to_owned(),
        other => serde_yaml::to_string(other)
            .map(|rendered| rendered.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Deep-merge `right` into `left`: mappings merge key by key, anything
/// else on the right replaces the left side.
pub fn deep_merge(left: &mut DocValue, right: DocValue) {
    match (left, right) {
        (DocValue::Map(left_map), DocValue::Map(right_map)) => {
            for (key, right_value) in right_map {
                match left_map.get_mut(&key) {
                    Some(left_value) => deep_merge(left_value, right_value),
                    None => {
                        left_map.insert(key, right_value);
                    }
                }
            }
        }
        (left, right) => *left = right,
    }
}
