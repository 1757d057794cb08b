//! Uncomment operation coordination

use crate::cli::Args;
use crate::config::Options;
use crate::config::validation::validate_options;
use crate::config::yaml::load_options;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::GraftError;
use crate::model::catalog::CatalogIngester;
use crate::model::chart::ChartIngester;
use crate::model::structure::{Source, StructureModel};
use crate::operations::lint::{LintLevel, LintRecord, LintValidator, count_level};
use crate::operations::repair::RepairLoop;
use crate::operations::uncomment::UncommentDecider;
use crate::system::System;
use crate::template::classifier::TemplateClassifier;
use crate::template::line::{Classification, TemplateLine};
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::io::Write as _;
use std::path::PathBuf;
use tracing::{debug, info};

/// Files a run reads and writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    pub template: PathBuf,
    /// Directory of chart archives
    pub charts: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    /// Written to stdout when absent
    pub output: Option<PathBuf>,
    /// JSON run report
    pub report: Option<PathBuf>,
    /// Number of model paths to log at debug level
    pub trace_samples: usize,
}

/// Counters of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lines_classified: usize,
    pub empty_lines: usize,
    pub documentation_lines: usize,
    pub constraint_lines: usize,
    pub active_data_lines: usize,
    pub inactive_data_lines: usize,
    pub lines_uncommented: usize,
    pub constraints_seen: usize,
    pub inactive_unmatched: usize,
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub values_parsed: usize,
    pub values_skipped: usize,
    pub catalog_records_ingested: usize,
    pub catalog_records_skipped: usize,
    pub lint_errors: usize,
    pub lint_warnings: usize,
    pub repair_passes: usize,
    pub lines_reverted: usize,
}

impl RunSummary {
    /// No lint errors remain in the output
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.lint_errors == 0
    }

    fn count_lines(&mut self, lines: &[TemplateLine]) {
        self.lines_classified = lines.len();
        for line in lines {
            match line.classification {
                Classification::Empty => self.empty_lines += 1,
                Classification::Documentation => self.documentation_lines += 1,
                Classification::Constraint => self.constraint_lines += 1,
                Classification::ActiveData => self.active_data_lines += 1,
                Classification::InactiveData => self.inactive_data_lines += 1,
            }
        }
    }

    fn log(&self) {
        info!("\u{2713} Completed uncomment run");
        info!("  Lines classified: {}", self.lines_classified);
        info!("  Lines uncommented: {}", self.lines_uncommented);
        info!("  Unmatched commented parameters: {}", self.inactive_unmatched);
        info!("  Constraints seen: {}", self.constraints_seen);
        info!(
            "  Archives processed: {} (skipped {})",
            self.archives_processed, self.archives_skipped
        );
        info!(
            "  Catalog records ingested: {} (skipped {})",
            self.catalog_records_ingested, self.catalog_records_skipped
        );
        info!(
            "  Lint errors: {}, warnings: {}",
            self.lint_errors, self.lint_warnings
        );
        if self.lines_reverted > 0 {
            info!(
                "  Lines reverted: {} in {} repair passes",
                self.lines_reverted, self.repair_passes
            );
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub document: String,
    pub summary: RunSummary,
    pub lint: Vec<LintRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
struct Report<'r> {
    summary: &'r RunSummary,
    lint: &'r [LintRecord],
    diagnostics: &'r [Diagnostic],
}

/// Coordinates a complete uncomment run
#[non_exhaustive]
pub struct UncommentOperation<'src> {
    options: Options,
    inputs: Inputs,
    system: &'src dyn System,
}

impl<'src> UncommentOperation<'src> {
    /// Create an operation from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The options file cannot be found, loaded or validated
    /// - The options are invalid after applying command-line overrides
    #[inline]
    pub fn new(args: &Args, system: &'src dyn System) -> Result<Self> {
        let mut options = load_options(system, args.config.as_deref())?;
        options.apply(&args.overrides());
        validate_options(&options)?;

        Ok(Self::with_options(options, args.inputs(), system))
    }

    /// Create an operation from already validated options
    #[must_use]
    #[inline]
    pub const fn with_options(options: Options, inputs: Inputs, system: &'src dyn System) -> Self {
        Self {
            options,
            inputs,
            system,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Run the pipeline: build the model, classify, decide, emit, lint and
    /// repair. Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The template cannot be read
    #[inline]
    pub fn execute(&self) -> Result<RunOutcome> {
        info!("Starting valuegraft run on {}", self.inputs.template.display());

        let template = self.system.read_to_string(&self.inputs.template).map_err(|err| {
            GraftError::input(format!(
                "Failed to read template {}: {err}",
                self.inputs.template.display()
            ))
        })?;

        let mut diagnostics = Diagnostics::new();
        let mut summary = RunSummary::default();
        let model = self.build_model(&mut diagnostics, &mut summary)?;

        let classifier = TemplateClassifier::new(&model, &self.options)?;
        let lines = classifier.classify(&template, &mut diagnostics);
        summary.count_lines(&lines);

        let decider = UncommentDecider::new(&model, &self.options);
        let (mut decided, stats) = decider.decide(&lines, &mut diagnostics);
        summary.constraints_seen = stats.constraints_seen;
        summary.inactive_unmatched = stats.inactive_unmatched;

        let validator = LintValidator::new(self.options.lint.clone());
        let repair = RepairLoop::new(
            &validator,
            self.options.repair_strategy,
            self.options.repair_passes,
        )
        .run(&mut decided, &mut diagnostics);

        summary.lines_uncommented = stats.uncommented.saturating_sub(repair.reverted);
        summary.lines_reverted = repair.reverted;
        summary.repair_passes = repair.passes;
        summary.lint_errors = count_level(&repair.records, LintLevel::Error);
        summary.lint_warnings = count_level(&repair.records, LintLevel::Warning);
        for record in &repair.records {
            debug!(
                rule = record.rule,
                line = record.line,
                "lint {:?} at {}:{}: {}",
                record.level,
                record.line,
                record.column,
                record.message
            );
        }
        summary.log();

        Ok(RunOutcome {
            document: repair.document,
            summary,
            lint: repair.records,
            diagnostics: diagnostics.into_entries(),
        })
    }

    /// Write the document (to the output file or stdout) and the report
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output file or stdout cannot be written
    /// - The report directory cannot be created
    /// - The report cannot be serialized or written
    #[inline]
    pub fn write_outputs(&self, outcome: &RunOutcome) -> Result<()> {
        match self.inputs.output.as_ref() {
            Some(path) => {
                self.system
                    .write(path, outcome.document.as_bytes())
                    .map_err(|err| {
                        GraftError::output(format!("Failed to write {}: {err}", path.display()))
                    })?;
                info!("Wrote {}", path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(outcome.document.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|err| GraftError::output(format!("Failed to write to stdout: {err}")))?;
            }
        }

        if let Some(path) = self.inputs.report.as_ref() {
            let report = Report {
                summary: &outcome.summary,
                lint: &outcome.lint,
                diagnostics: &outcome.diagnostics,
            };
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !self.system.is_dir(parent)
            {
                self.system.create_dir_all(parent).map_err(|err| {
                    GraftError::filesystem(format!(
                        "Failed to create report directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
            self.system.write(path, json.as_bytes()).map_err(|err| {
                GraftError::output(format!("Failed to write report {}: {err}", path.display()))
            })?;
            debug!("Wrote report {}", path.display());
        }

        Ok(())
    }

    /// Build the structure model from charts, then the catalog
    fn build_model(&self, diagnostics: &mut Diagnostics, summary: &mut RunSummary) -> Result<StructureModel> {
        let mut model = StructureModel::new();

        if let Some(charts) = self.inputs.charts.as_ref() {
            let ingester = ChartIngester::new(self.system, &self.options.chart_values_basename)?;
            let (document, stats) = ingester.ingest_dir(charts, diagnostics);
            model.ingest_document(&document, Source::Chart);
            summary.archives_processed = stats.archives_processed;
            summary.archives_skipped = stats.archives_skipped;
            summary.values_parsed = stats.values_parsed;
            summary.values_skipped = stats.values_skipped;
        }

        if let Some(catalog) = self.inputs.catalog.as_ref() {
            let (entries, stats) = CatalogIngester::new(self.system).load(catalog, diagnostics);
            summary.catalog_records_ingested = model.ingest_catalog(&entries);
            summary.catalog_records_skipped = stats.records_skipped;
        }

        debug!("Structure model holds {} nodes", model.len());
        for path in model.trace_sample_paths(self.inputs.trace_samples) {
            debug!("  model path: {path}");
        }
        Ok(model)
    }
}
