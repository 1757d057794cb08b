//! Structural linter for the emitted document
//!
//! Relaxed defaults with indentation promoted to an error and line length
//! disabled. Every rule's level can be changed through [`LintConfig`].

use crate::template::line::{split_lines, strip_terminator};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configured level of a lint rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Error,
    Warning,
    Disable,
}

impl RuleLevel {
    const fn level(self) -> Option<LintLevel> {
        match self {
            Self::Error => Some(LintLevel::Error),
            Self::Warning => Some(LintLevel::Warning),
            Self::Disable => None,
        }
    }
}

/// Level of a reported lint problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Warning,
    Error,
}

/// A single lint problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintRecord {
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub level: LintLevel,
    pub message: String,
    pub rule: &'static str,
}

/// Per-rule levels and rule parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LintConfig {
    pub syntax: RuleLevel,
    pub indentation: RuleLevel,
    pub key_duplicates: RuleLevel,
    pub trailing_spaces: RuleLevel,
    pub empty_lines: RuleLevel,
    pub max_empty_lines: usize,
    pub new_line_at_end_of_file: RuleLevel,
    pub line_length: RuleLevel,
    pub max_line_length: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            syntax: RuleLevel::Error,
            indentation: RuleLevel::Error,
            key_duplicates: RuleLevel::Error,
            trailing_spaces: RuleLevel::Warning,
            empty_lines: RuleLevel::Warning,
            max_empty_lines: 2,
            new_line_at_end_of_file: RuleLevel::Warning,
            line_length: RuleLevel::Disable,
            max_line_length: 120,
        }
    }
}

/// A line that takes part in the document structure
#[derive(Debug)]
struct StructuralLine<'t> {
    line_no: usize,
    indent: usize,
    /// Content with indentation and trailing comment removed
    content: &'t str,
}

impl StructuralLine<'_> {
    fn is_sequence_item(&self) -> bool {
        self.content == "-" || self.content.starts_with("- ")
    }

    /// Column where the content of a `- ` item starts
    fn item_content_indent(&self) -> usize {
        let after_dash = &self.content[1..];
        self.indent + 1 + (after_dash.len() - after_dash.trim_start().len())
    }

    fn opens_block(&self) -> bool {
        self.content == "-" || self.content.ends_with(':')
    }

    fn is_document_marker(&self) -> bool {
        self.indent == 0 && (self.content.starts_with("---") || self.content.starts_with("..."))
    }
}

/// Lints documents with a fixed rule configuration
#[derive(Debug, Clone, Default)]
pub struct LintValidator {
    config: LintConfig,
}

impl LintValidator {
    #[must_use]
    pub const fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Lint `text`, returning problems ordered by position. A line that
    /// fails to parse is not also reported for its indentation.
    #[must_use]
    pub fn lint(&self, text: &str) -> Vec<LintRecord> {
        let mut records = Vec::new();
        let config = &self.config;

        if let Some(level) = config.syntax.level() {
            check_syntax(text, level, &mut records);
        }

        let structural = structural_lines(text);
        if let Some(level) = config.indentation.level() {
            check_indentation(&structural, level, &mut records);
        }
        if let Some(level) = config.key_duplicates.level() {
            check_key_duplicates(&structural, level, &mut records);
        }
        if let Some(level) = config.trailing_spaces.level() {
            check_trailing_spaces(text, level, &mut records);
        }
        if let Some(level) = config.empty_lines.level() {
            check_empty_lines(text, config.max_empty_lines, level, &mut records);
        }
        if let Some(level) = config.new_line_at_end_of_file.level() {
            check_final_newline(text, level, &mut records);
        }
        if let Some(level) = config.line_length.level() {
            check_line_length(text, config.max_line_length, level, &mut records);
        }

        let syntax_lines: HashSet<usize> = records
            .iter()
            .filter(|record| record.rule == "syntax")
            .map(|record| record.line)
            .collect();
        records.retain(|record| record.rule != "indentation" || !syntax_lines.contains(&record.line));

        records.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
        records
    }
}

/// Count of records at `level`
#[must_use]
pub fn count_level(records: &[LintRecord], level: LintLevel) -> usize {
    records.iter().filter(|record| record.level == level).count()
}

fn check_syntax(text: &str, level: LintLevel, records: &mut Vec<LintRecord>) {
    for document in serde_yaml::Deserializer::from_str(text) {
        if let Err(err) = IgnoredAny::deserialize(document) {
            let (line, column) = err
                .location()
                .map_or((1, 1), |location| (location.line(), location.column()));
            records.push(LintRecord {
                line,
                column,
                level,
                message: format!("syntax error: {err}"),
                rule: "syntax",
            });
            break;
        }
    }
}

fn check_indentation(lines: &[StructuralLine<'_>], level: LintLevel, records: &mut Vec<LintRecord>) {
    let mut levels: Vec<usize> = vec![0];
    let mut spaces: Option<usize> = None;
    let mut previous_opens_block = false;

    for line in lines {
        if line.is_document_marker() {
            levels = vec![0];
            previous_opens_block = false;
            continue;
        }

        let top = levels.last().copied().unwrap_or(0);
        if line.indent > top {
            let delta = line.indent - top;
            if !previous_opens_block {
                records.push(indentation_record(line, top, level));
            } else if let Some(expected) = spaces
                && expected != delta
            {
                records.push(indentation_record(line, top + expected, level));
            } else {
                spaces = Some(delta);
            }
            levels.push(line.indent);
        } else if line.indent < top {
            let mut child_level = top;
            while let Some(&indent) = levels.last()
                && indent > line.indent
            {
                child_level = indent;
                levels.pop();
            }
            let landed = levels.last().copied().unwrap_or(0);
            if landed != line.indent {
                records.push(indentation_record(line, child_level, level));
                levels.push(line.indent);
            }
        }

        if line.is_sequence_item() && line.content != "-" {
            levels.push(line.item_content_indent());
        }
        previous_opens_block = line.opens_block();
    }
}

fn indentation_record(line: &StructuralLine<'_>, expected: usize, level: LintLevel) -> LintRecord {
    LintRecord {
        line: line.line_no,
        column: line.indent + 1,
        level,
        message: format!(
            "wrong indentation: expected {expected} but found {}",
            line.indent
        ),
        rule: "indentation",
    }
}

fn check_key_duplicates(lines: &[StructuralLine<'_>], level: LintLevel, records: &mut Vec<LintRecord>) {
    let mut mappings: Vec<(usize, HashSet<String>)> = Vec::new();

    for line in lines {
        if line.is_document_marker() {
            mappings.clear();
            continue;
        }

        let (column, content, new_element) = if line.is_sequence_item() {
            (line.item_content_indent(), line.content[1..].trim_start(), true)
        } else {
            (line.indent, line.content, false)
        };

        let pops_same_level = |indent: usize| indent > column || (new_element && indent == column);
        while mappings.last().is_some_and(|(indent, _)| pops_same_level(*indent)) {
            mappings.pop();
        }

        let Some(key) = mapping_key(content) else {
            continue;
        };
        if key == "<<" {
            continue;
        }

        match mappings.last_mut() {
            Some((indent, keys)) if *indent == column => {
                if !keys.insert(key.to_owned()) {
                    records.push(LintRecord {
                        line: line.line_no,
                        column: column + 1,
                        level,
                        message: format!("duplication of key \"{key}\" in mapping"),
                        rule: "key-duplicates",
                    });
                }
            }
            _ => mappings.push((column, HashSet::from([key.to_owned()]))),
        }
    }
}

/// Key of a `key: value` / `key:` line, quotes removed
fn mapping_key(content: &str) -> Option<&str> {
    let key = if let Some(stripped) = content.strip_suffix(':') {
        stripped
    } else {
        content.split_once(": ").map(|(key, _)| key)?
    };
    let key = key.trim();
    if key.is_empty() || key.starts_with(['[', '{', '-']) {
        return None;
    }
    Some(key.trim_matches(|c| c == '"' || c == '\''))
}

fn check_trailing_spaces(text: &str, level: LintLevel, records: &mut Vec<LintRecord>) {
    for (index, raw) in split_lines(text).into_iter().enumerate() {
        let body = strip_terminator(raw);
        let trimmed = body.trim_end_matches([' ', '\t']);
        if trimmed.len() != body.len() {
            records.push(LintRecord {
                line: index + 1,
                column: trimmed.chars().count() + 1,
                level,
                message: "trailing spaces".to_owned(),
                rule: "trailing-spaces",
            });
        }
    }
}

fn check_empty_lines(text: &str, max: usize, level: LintLevel, records: &mut Vec<LintRecord>) {
    let mut run = 0;
    let lines = split_lines(text);
    for (index, raw) in lines.iter().enumerate() {
        if strip_terminator(raw).trim().is_empty() {
            run += 1;
            let run_ends = lines
                .get(index + 1)
                .is_none_or(|next| !strip_terminator(next).trim().is_empty());
            if run_ends && run > max {
                records.push(LintRecord {
                    line: index + 1,
                    column: 1,
                    level,
                    message: format!("too many blank lines ({run} > {max})"),
                    rule: "empty-lines",
                });
            }
        } else {
            run = 0;
        }
    }
}

fn check_final_newline(text: &str, level: LintLevel, records: &mut Vec<LintRecord>) {
    if text.is_empty() || text.ends_with('\n') {
        return;
    }
    let lines = split_lines(text);
    records.push(LintRecord {
        line: lines.len(),
        column: lines.last().map_or(0, |last| last.chars().count()) + 1,
        level,
        message: "no new line character at the end of file".to_owned(),
        rule: "new-line-at-end-of-file",
    });
}

fn check_line_length(text: &str, max: usize, level: LintLevel, records: &mut Vec<LintRecord>) {
    for (index, raw) in split_lines(text).into_iter().enumerate() {
        let length = strip_terminator(raw).chars().count();
        if length > max {
            records.push(LintRecord {
                line: index + 1,
                column: max + 1,
                level,
                message: format!("line too long ({length} > {max} characters)"),
                rule: "line-length",
            });
        }
    }
}

/// Lines taking part in the structure: no blanks, no comments, no block
/// scalar bodies and no continuation lines of multi-line flow collections
fn structural_lines(text: &str) -> Vec<StructuralLine<'_>> {
    let mut out = Vec::new();
    let mut block_scalar: Option<usize> = None;
    let mut flow_depth: usize = 0;

    for (index, raw) in split_lines(text).into_iter().enumerate() {
        let body = strip_terminator(raw);
        let content = body.trim_start_matches(' ');
        let indent = body.len() - content.len();
        let content = strip_comment(content).trim_end();
        if content.is_empty() {
            continue;
        }

        if let Some(block_indent) = block_scalar {
            if indent > block_indent {
                continue;
            }
            block_scalar = None;
        }

        let continuation = flow_depth > 0;
        flow_depth = update_flow_depth(flow_depth, content);
        if continuation {
            continue;
        }

        if opens_block_scalar(content) {
            block_scalar = Some(indent);
        }
        out.push(StructuralLine {
            line_no: index + 1,
            indent,
            content,
        });
    }
    out
}

fn opens_block_scalar(content: &str) -> bool {
    let value = content
        .rsplit_once(": ")
        .map(|(_, value)| value)
        .or_else(|| content.strip_prefix("- "))
        .unwrap_or_default()
        .trim();
    value.starts_with(['|', '>'])
        && value[1..]
            .chars()
            .all(|c| matches!(c, '-' | '+') || c.is_ascii_digit())
}

/// Remove a trailing ` # comment` that is not inside quotes
fn strip_comment(content: &str) -> &str {
    if content.starts_with('#') {
        return "";
    }
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for (offset, c) in content.char_indices() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' && (previous == ' ' || previous == '\t') => return &content[..offset],
            None => {}
        }
        previous = c;
    }
    content
}

fn update_flow_depth(depth: usize, content: &str) -> usize {
    let mut depth = depth;
    let mut quote: Option<char> = None;
    for c in content.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '{' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                _ => {}
            },
        }
    }
    depth
}
