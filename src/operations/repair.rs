//! Bounded lint/repair loop

use crate::diagnostics::{Diagnostics, Severity};
use crate::operations::emit::emit;
use crate::operations::lint::{LintLevel, LintRecord, LintValidator, count_level};
use crate::operations::uncomment::DecidedLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a repair pass does about lint errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepairStrategy {
    /// Leave the document as emitted and report
    #[default]
    Report,
    /// Put back the commented text of uncommented lines that carry errors
    Revert,
}

/// Result of the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    pub document: String,
    /// Lint records of the final document
    pub records: Vec<LintRecord>,
    pub passes: usize,
    pub reverted: usize,
}

/// Runs lint, then repair passes while errors remain
pub struct RepairLoop<'a> {
    validator: &'a LintValidator,
    strategy: RepairStrategy,
    max_passes: usize,
}

impl<'a> RepairLoop<'a> {
    #[must_use]
    pub const fn new(validator: &'a LintValidator, strategy: RepairStrategy, max_passes: usize) -> Self {
        Self {
            validator,
            strategy,
            max_passes,
        }
    }

    /// Emit and lint `lines`, repairing them in place
    pub fn run(&self, lines: &mut [DecidedLine], diagnostics: &mut Diagnostics) -> RepairOutcome {
        let mut document = emit(lines);
        let mut records = self.validator.lint(&document);
        let mut passes = 0;
        let mut reverted = 0;

        while passes < self.max_passes && count_level(&records, LintLevel::Error) > 0 {
            if self.strategy == RepairStrategy::Report {
                break;
            }
            passes += 1;

            let error_lines: BTreeSet<usize> = records
                .iter()
                .filter(|record| record.level == LintLevel::Error)
                .map(|record| record.line)
                .collect();

            let mut changed = 0;
            for line in lines.iter_mut() {
                if line.uncommented && error_lines.contains(&line.line_no) {
                    line.revert();
                    changed += 1;
                    diagnostics.record(
                        Severity::Warning,
                        "lint.reverted",
                        Some(line.line_no),
                        "Uncommented line caused a lint error, restored the commented text",
                    );
                }
            }
            if changed == 0 {
                break;
            }

            reverted += changed;
            document = emit(lines);
            records = self.validator.lint(&document);
        }

        RepairOutcome {
            document,
            records,
            passes,
            reverted,
        }
    }
}
