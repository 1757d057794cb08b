//! `ValueGraft` - uncomments known parameters in commented YAML templates
//!
//! Vendors ship configuration templates where most parameters are commented
//! out next to free-form documentation. This library builds a model of the
//! parameters a product knows (from chart archives and a flat catalog),
//! classifies every template line, uncomments the recognised parameters at
//! the indent the model implies and lints the result.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod keypath;
pub mod model;
pub mod operations;
pub mod system;
pub mod template;

use anyhow::Result;
use cli::Args;
use operations::pipeline::{RunSummary, UncommentOperation};
use system::RealSystem;

/// Main entry point for the valuegraft library
///
/// # Errors
///
/// Returns an error if:
/// - The options are missing or invalid
/// - The template cannot be read
/// - The output or report cannot be written
#[inline]
pub fn run(args: &Args) -> Result<RunSummary> {
    let system = RealSystem::new();
    let operation = UncommentOperation::new(args, &system)?;
    let outcome = operation.execute()?;
    operation.write_outputs(&outcome)?;
    Ok(outcome.summary)
}
