//! Operations module
//!
//! Coordinates an uncomment run: deciding, emitting, linting and repairing

pub mod emit;
pub mod lint;
pub mod pipeline;
pub mod repair;
pub mod uncomment;

pub use emit::emit;
pub use lint::{LintConfig, LintLevel, LintRecord, LintValidator};
pub use pipeline::{Inputs, RunOutcome, RunSummary, UncommentOperation};
pub use repair::{RepairLoop, RepairStrategy};
pub use uncomment::{DecidedLine, UncommentDecider};
