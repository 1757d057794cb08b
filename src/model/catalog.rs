//! Flat parameter catalog loading
//!
//! The catalog is a JSON (or YAML) array of records. Each record names a
//! parameter by `path` (preferred) or dotted `name`; the remaining fields
//! are kept as metadata on the parameter's node.

use crate::diagnostics::Diagnostics;
use crate::keypath::ParamPath;
use crate::model::structure::NodeMetadata;
use crate::system::System;
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

/// A catalog record after validation and tokenizing
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub path: ParamPath,
    pub description: Option<String>,
    pub metadata: NodeMetadata,
}

/// Raw record as found in the catalog file
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mandatory: Option<JsonValue>,
    #[serde(default)]
    format: Option<JsonValue>,
    #[serde(default)]
    status: Option<JsonValue>,
    #[serde(default)]
    release: Option<JsonValue>,
    #[serde(default)]
    description: Option<JsonValue>,
    #[serde(flatten)]
    extra: BTreeMap<String, JsonValue>,
}

/// Counters reported by a catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub records_seen: usize,
    pub records_skipped: usize,
}

/// Loads the flat parameter catalog
pub struct CatalogIngester<'a> {
    system: &'a dyn System,
}

impl<'a> CatalogIngester<'a> {
    #[must_use]
    pub fn new(system: &'a dyn System) -> Self {
        Self { system }
    }

    /// Read and validate the catalog at `path`.
    ///
    /// Never fails: an unreadable or unparsable catalog yields no entries
    /// and an error diagnostic.
    pub fn load(
        &self,
        path: &Path,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<CatalogEntry>, CatalogStats) {
        let content = match self.system.read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                diagnostics.error(
                    "catalog.unreadable",
                    format!("Failed to read catalog {}: {err}", path.display()),
                );
                return (Vec::new(), CatalogStats::default());
            }
        };

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        match parse_records(&content, is_json) {
            Ok(records) => entries_from_records(records, diagnostics),
            Err(err) => {
                diagnostics.error(
                    "catalog.unparsable",
                    format!("Failed to parse catalog {}: {err:#}", path.display()),
                );
                (Vec::new(), CatalogStats::default())
            }
        }
    }
}

/// Parse catalog text into raw records. The top level is either an array
/// or a mapping holding a `parameters` array.
///
/// # Errors
///
/// Returns an error if:
/// - The text is not valid JSON / YAML
/// - The top level holds no record array
pub fn parse_records(content: &str, is_json: bool) -> Result<Vec<JsonValue>> {
    let document: JsonValue = if is_json {
        serde_json::from_str(content).context("Invalid JSON")?
    } else {
        serde_yaml::from_str(content).context("Invalid YAML")?
    };

    match document {
        JsonValue::Array(records) => Ok(records),
        JsonValue::Object(mut object) => match object.remove("parameters") {
            Some(JsonValue::Array(records)) => Ok(records),
            _ => bail!("expected an array of records or a 'parameters' array"),
        },
        JsonValue::Null => Ok(Vec::new()),
        _ => bail!("expected an array of records"),
    }
}

/// Validate raw records, selecting `path` over `name` and tokenizing it
pub fn entries_from_records(
    records: Vec<JsonValue>,
    diagnostics: &mut Diagnostics,
) -> (Vec<CatalogEntry>, CatalogStats) {
    let mut stats = CatalogStats::default();
    let mut entries = Vec::with_capacity(records.len());

    for (index, raw) in records.into_iter().enumerate() {
        stats.records_seen += 1;
        let record: CatalogRecord = match serde_json::from_value(raw) {
            Ok(record) => record,
            Err(err) => {
                stats.records_skipped += 1;
                diagnostics.error(
                    "catalog.record-invalid",
                    format!("Catalog record #{}: {err}", index + 1),
                );
                continue;
            }
        };

        let primary = record.path.as_deref().filter(|p| !p.trim().is_empty());
        let fallback = record.name.as_deref().filter(|n| !n.trim().is_empty());
        let text = match (primary, fallback) {
            (Some(path), _) => path,
            (None, Some(name)) => {
                diagnostics.warn(
                    "catalog.name-fallback",
                    format!("Catalog record #{} has no 'path', using 'name' {name}", index + 1),
                );
                name
            }
            (None, None) => {
                stats.records_skipped += 1;
                diagnostics.error(
                    "catalog.record-unnamed",
                    format!("Catalog record #{} has neither 'path' nor 'name'", index + 1),
                );
                continue;
            }
        };

        let path = ParamPath::parse(text.trim());
        if path.is_empty() {
            stats.records_skipped += 1;
            diagnostics.error(
                "catalog.record-unnamed",
                format!("Catalog record #{} has an empty path '{text}'", index + 1),
            );
            continue;
        }

        entries.push(CatalogEntry {
            path,
            description: record.description.and_then(scalar_text),
            metadata: NodeMetadata {
                mandatory: record.mandatory.and_then(flag),
                format: record.format.and_then(scalar_text),
                status: record.status.and_then(scalar_text),
                release: record.release.and_then(scalar_text),
                extra: record.extra,
            },
        });
    }

    (entries, stats)
}

fn scalar_text(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text),
        JsonValue::Number(number) => Some(number.to_string()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn flag(value: JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(flag) => Some(flag),
        JsonValue::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "y" => Some(true),
            "no" | "false" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
