use crate::config::Overrides;
use crate::operations::pipeline::Inputs;
use crate::operations::repair::RepairStrategy;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for valuegraft
#[derive(Parser, Debug, Clone)]
#[command(name = "valuegraft")]
#[command(about = "Uncomment known parameters in commented YAML configuration templates")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Template to transform
    #[arg(long, value_name = "PATH")]
    pub template: String,

    /// Directory of chart archives (.tgz, .tar.gz, .tar)
    #[arg(long, value_name = "DIR")]
    pub charts: Option<String>,

    /// Flat parameter catalog (JSON or YAML)
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<String>,

    /// Where to write the transformed document (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Options file path
    #[arg(long, value_name = "PATH", env = "VALUEGRAFT_CONFIG")]
    pub config: Option<String>,

    /// Write a JSON report with counters, lint records and diagnostics
    #[arg(long, value_name = "PATH")]
    pub report: Option<String>,

    /// Spaces per nesting level of uncommented lines
    #[arg(long, value_name = "N")]
    pub indent_step: Option<usize>,

    /// Columns a tab counts for
    #[arg(long, value_name = "N")]
    pub tab_size: Option<usize>,

    /// Maximum lint/repair cycles
    #[arg(long, value_name = "N")]
    pub repair_passes: Option<usize>,

    /// What to do about lint errors in uncommented lines
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub repair_strategy: Option<RepairStrategy>,

    /// File name of values files inside chart archives
    #[arg(long, value_name = "NAME")]
    pub values_basename: Option<String>,

    /// Constraint keyword (can be specified multiple times, replaces the defaults)
    #[arg(long = "constraint-keyword", value_name = "KEYWORD")]
    pub constraint_keywords: Vec<String>,

    /// Only uncomment lines whose own key is known
    #[arg(long)]
    pub no_cascade: bool,

    /// Log up to N structure model paths at debug level
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub trace_samples: usize,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Option values given on the command line
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            indent_step: self.indent_step,
            tab_size: self.tab_size,
            constraint_keywords: self.constraint_keywords.clone(),
            repair_passes: self.repair_passes,
            repair_strategy: self.repair_strategy,
            chart_values_basename: self.values_basename.clone(),
            no_cascade: self.no_cascade,
        }
    }

    /// Files named on the command line
    #[must_use]
    pub fn inputs(&self) -> Inputs {
        Inputs {
            template: PathBuf::from(&self.template),
            charts: self.charts.as_ref().map(PathBuf::from),
            catalog: self.catalog.as_ref().map(PathBuf::from),
            output: self.output.as_ref().map(PathBuf::from),
            report: self.report.as_ref().map(PathBuf::from),
            trace_samples: self.trace_samples,
        }
    }

    /// Default log filter for the verbosity flags
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
