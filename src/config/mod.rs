//! Configuration management module
//!
//! Handles options file discovery and parsing, JSON schema validation,
//! semantic validation and command-line overrides

pub mod schema;
pub mod validation;
pub mod yaml;

use crate::operations::lint::LintConfig;
use crate::operations::repair::RepairStrategy;
use serde::{Deserialize, Serialize};

/// Engine options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct Options {
    /// Spaces per nesting level of uncommented lines
    pub indent_step: usize,

    /// Columns a tab counts for when measuring indentation
    pub tab_size: usize,

    /// Case-insensitive markers of constraint comments
    pub constraint_keywords: Vec<String>,

    /// Maximum lint/repair cycles
    pub repair_passes: usize,

    pub repair_strategy: RepairStrategy,

    /// Name of the values files inside chart archives
    pub chart_values_basename: String,

    /// Uncomment the block below a recognised container
    pub force_uncomment_cascade: bool,

    /// Unknown commented keys at least this long are taken for prose
    pub heuristic_key_length: usize,

    pub lint: LintConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            indent_step: 2,
            tab_size: 2,
            constraint_keywords: ["mandatory", "must", "do not", "readonly", "obsolete"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            repair_passes: 2,
            repair_strategy: RepairStrategy::Report,
            chart_values_basename: "values.yaml".to_owned(),
            force_uncomment_cascade: true,
            heuristic_key_length: 50,
            lint: LintConfig::default(),
        }
    }
}

/// Values given on the command line, each replacing the file's value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub indent_step: Option<usize>,
    pub tab_size: Option<usize>,
    pub constraint_keywords: Vec<String>,
    pub repair_passes: Option<usize>,
    pub repair_strategy: Option<RepairStrategy>,
    pub chart_values_basename: Option<String>,
    pub no_cascade: bool,
}

impl Options {
    /// Apply command-line overrides on top of these options
    #[inline]
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(indent_step) = overrides.indent_step {
            self.indent_step = indent_step;
        }
        if let Some(tab_size) = overrides.tab_size {
            self.tab_size = tab_size;
        }
        if !overrides.constraint_keywords.is_empty() {
            self.constraint_keywords.clone_from(&overrides.constraint_keywords);
        }
        if let Some(repair_passes) = overrides.repair_passes {
            self.repair_passes = repair_passes;
        }
        if let Some(strategy) = overrides.repair_strategy {
            self.repair_strategy = strategy;
        }
        if let Some(basename) = overrides.chart_values_basename.as_ref() {
            self.chart_values_basename.clone_from(basename);
        }
        if overrides.no_cascade {
            self.force_uncomment_cascade = false;
        }
    }
}
