//! Chart archive ingestion
//!
//! Reads every (optionally gzipped) tar archive of a directory, picks the
//! values files out of it, strips templating tags, parses them and nests
//! each one under its sub-chart key path. All archives are deep-merged in
//! file name order.

use crate::diagnostics::Diagnostics;
use crate::model::value::{DocValue, deep_merge};
use crate::system::System;
use flate2::read::GzDecoder;
use anyhow::{Context as _, Result};
use regex::{NoExpand, Regex};
use serde_yaml::Value as YamlValue;
use std::borrow::Cow;
use std::io::{self, Read};
use std::path::Path;
use tar::Archive;

/// Text substituted for every `{{ ... }}` span in a values file
pub const TEMPLATE_SENTINEL: &str = " #valuegraft:template";

/// Shortest `{{ ... }}` span, line breaks included
const TEMPLATE_TAG_PATTERN: &str = r"(?s)\{\{.*?\}\}";

/// How deep packed sub-chart archives are followed
const MAX_NESTED_ARCHIVES: usize = 8;

/// Counters reported by a chart directory ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartStats {
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub values_parsed: usize,
    pub values_skipped: usize,
}

/// A values file found inside an archive
#[derive(Debug)]
struct ValuesMember {
    /// Archive-internal path, nested archives already flattened into it
    path: String,
    bytes: Vec<u8>,
}

/// Extracts and merges chart values files
pub struct ChartIngester<'a> {
    system: &'a dyn System,
    values_basename: String,
    template_tags: Regex,
}

impl<'a> ChartIngester<'a> {
    /// # Errors
    ///
    /// Returns an error if the template tag pattern does not compile
    #[inline]
    pub fn new(system: &'a dyn System, values_basename: &str) -> Result<Self> {
        Ok(Self {
            system,
            values_basename: values_basename.to_owned(),
            template_tags: template_tag_regex()?,
        })
    }

    /// Ingest every archive of `dir` into one merged document.
    ///
    /// A missing directory yields an empty mapping and a warning.
    pub fn ingest_dir(&self, dir: &Path, diagnostics: &mut Diagnostics) -> (DocValue, ChartStats) {
        let mut stats = ChartStats::default();
        let mut merged = DocValue::empty_map();

        if !self.system.is_dir(dir) {
            diagnostics.warn(
                "chart.dir-missing",
                format!("Chart directory not found: {}", dir.display()),
            );
            return (merged, stats);
        }

        let entries = match self.system.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                diagnostics.warn(
                    "chart.dir-unreadable",
                    format!("Failed to list chart directory {}: {err}", dir.display()),
                );
                return (merged, stats);
            }
        };

        let mut archives: Vec<_> = entries
            .into_iter()
            .filter(|entry| self.system.is_file(entry) && is_archive_name(&entry.to_string_lossy()))
            .collect();
        archives.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for archive_path in archives {
            let bytes = match self.system.read(&archive_path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    stats.archives_skipped += 1;
                    diagnostics.warn(
                        "chart.archive-unreadable",
                        format!("Failed to read archive {}: {err}", archive_path.display()),
                    );
                    continue;
                }
            };

            let label = archive_path.display().to_string();
            match self.ingest_archive(&label, &bytes, diagnostics, &mut stats) {
                Ok(document) => {
                    stats.archives_processed += 1;
                    deep_merge(&mut merged, document);
                }
                Err(err) => {
                    stats.archives_skipped += 1;
                    diagnostics.warn(
                        "chart.archive-unreadable",
                        format!("Failed to extract archive {label}: {err}"),
                    );
                }
            }
        }

        (merged, stats)
    }

    /// Ingest a single archive held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The archive (or a packed sub-chart inside it) cannot be decoded
    pub fn ingest_archive(
        &self,
        label: &str,
        bytes: &[u8],
        diagnostics: &mut Diagnostics,
        stats: &mut ChartStats,
    ) -> io::Result<DocValue> {
        let mut members = Vec::new();
        self.collect_members(bytes, "", 0, diagnostics, &mut members)?;

        // Deeper sub-charts first so the parent chart's values win on conflicts
        let mut keyed: Vec<(Vec<String>, ValuesMember)> = members
            .into_iter()
            .map(|member| (subchart_keys(&member.path), member))
            .collect();
        keyed.sort_by(|(keys_a, a), (keys_b, b)| {
            keys_b.len().cmp(&keys_a.len()).then_with(|| a.path.cmp(&b.path))
        });

        let mut result = DocValue::empty_map();
        for (keys, member) in keyed {
            let Some(document) = parse_values(&self.template_tags, label, &member, diagnostics) else {
                stats.values_skipped += 1;
                continue;
            };
            stats.values_parsed += 1;
            deep_merge(&mut result, document.nest_under(&keys));
        }
        Ok(result)
    }

    fn collect_members(
        &self,
        bytes: &[u8],
        prefix: &str,
        nesting: usize,
        diagnostics: &mut Diagnostics,
        out: &mut Vec<ValuesMember>,
    ) -> io::Result<()> {
        let reader: Box<dyn Read + '_> = if is_gzip(bytes) {
            Box::new(GzDecoder::new(bytes))
        } else {
            Box::new(bytes)
        };
        let mut archive = Archive::new(reader);

        for entry in archive.entries()? {
            let mut entry = entry?;
            let raw_path = entry.path()?.to_string_lossy().into_owned();
            let member_path = join_member_path(prefix, &raw_path);
            let file_name = member_path.rsplit('/').next().unwrap_or_default();
            let is_regular = entry.header().entry_type().is_file();

            if file_name == self.values_basename {
                if !is_regular {
                    diagnostics.debug(
                        "chart.member-not-regular",
                        None,
                        format!("Skipping non-regular member {member_path}"),
                    );
                    continue;
                }
                let mut content = Vec::new();
                entry.read_to_end(&mut content)?;
                out.push(ValuesMember {
                    path: member_path,
                    bytes: content,
                });
            } else if is_regular && is_archive_name(file_name) && in_charts_dir(&member_path) {
                if nesting >= MAX_NESTED_ARCHIVES {
                    diagnostics.warn(
                        "chart.nesting-too-deep",
                        format!("Not following packed sub-chart {member_path}"),
                    );
                    continue;
                }
                let mut nested = Vec::new();
                entry.read_to_end(&mut nested)?;
                let nested_prefix = member_path
                    .rsplit_once('/')
                    .map_or("", |(dir, _)| dir)
                    .to_owned();
                self.collect_members(&nested, &nested_prefix, nesting + 1, diagnostics, out)?;
            }
        }
        Ok(())
    }
}

fn parse_values(
    template_tags: &Regex,
    label: &str,
    member: &ValuesMember,
    diagnostics: &mut Diagnostics,
) -> Option<DocValue> {
    let Ok(text) = core::str::from_utf8(&member.bytes) else {
        diagnostics.warn(
            "chart.values-not-utf8",
            format!("{label}: {} is not valid UTF-8, skipping", member.path),
        );
        return None;
    };

    let sanitized = sanitize_template_tags(template_tags, text);
    match serde_yaml::from_str::<YamlValue>(&sanitized) {
        Ok(YamlValue::Null) => Some(DocValue::empty_map()),
        Ok(value) => Some(DocValue::from(value)),
        Err(err) => {
            diagnostics.warn(
                "chart.values-unparsable",
                format!("{label}: failed to parse {}: {err}", member.path),
            );
            None
        }
    }
}

/// Compile the `{{ ... }}` span pattern
///
/// # Errors
///
/// Returns an error if the pattern does not compile
pub fn template_tag_regex() -> Result<Regex> {
    Regex::new(TEMPLATE_TAG_PATTERN)
        .with_context(|| format!("Invalid template tag pattern: {TEMPLATE_TAG_PATTERN}"))
}

/// Replace every `{{ ... }}` span (across lines, shortest match) with a
/// comment sentinel so the residue parses as YAML.
#[must_use]
pub fn sanitize_template_tags<'t>(template_tags: &Regex, text: &'t str) -> Cow<'t, str> {
    template_tags.replace_all(text, NoExpand(TEMPLATE_SENTINEL))
}

/// Key path of the sub-chart a member belongs to: every segment directly
/// after a `charts` segment, in order. The file name itself never counts.
#[must_use]
pub fn subchart_keys(member_path: &str) -> Vec<String> {
    let segments: Vec<&str> = member_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    let mut position = 0;
    while position < last {
        if segments[position] == "charts" && position + 1 < last {
            keys.push(segments[position + 1].to_owned());
            position += 2;
        } else {
            position += 1;
        }
    }
    keys
}

fn join_member_path(prefix: &str, raw: &str) -> String {
    let raw = raw.trim_start_matches("./");
    if prefix.is_empty() {
        raw.to_owned()
    } else {
        format!("{prefix}/{raw}")
    }
}

fn in_charts_dir(member_path: &str) -> bool {
    member_path
        .rsplit('/')
        .nth(1)
        .is_some_and(|parent| parent == "charts")
}

fn is_archive_name(name: &str) -> bool {
    name.ends_with(".tgz") || name.ends_with(".tar.gz") || name.ends_with(".tar")
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x1f, 0x8b])
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn subchart_keys_follow_charts_segments() {
        assert!(subchart_keys("app/values.yaml").is_empty());
        assert_eq!(subchart_keys("app/charts/db/values.yaml"), vec!["db"]);
        assert_eq!(
            subchart_keys("app/charts/db/charts/metrics/values.yaml"),
            vec!["db", "metrics"]
        );
        assert!(subchart_keys("charts/values.yaml").is_empty());
    }

    #[test]
    fn sanitize_spans_lines_non_greedily() {
        let text = "a: {{ .x }}\nb: {{- if\n .y }}c{{ end }}\n";
        let cleaned = sanitize_template_tags(&template_tag_regex().unwrap(), text);
        assert!(!cleaned.contains("{{"));
        assert_eq!(cleaned.matches(TEMPLATE_SENTINEL).count(), 3);
        assert!(cleaned.contains("c"));
    }

    #[test]
    fn sanitize_borrows_text_without_tags() {
        let tags = template_tag_regex().unwrap();
        assert!(matches!(sanitize_template_tags(&tags, "a: 1\n"), Cow::Borrowed(_)));

        let unclosed = "a: {{ .x\nb: 1\n";
        assert_eq!(sanitize_template_tags(&tags, unclosed), unclosed);
    }
}
