//! Semantic validation of options

use crate::config::Options;
use crate::error::GraftError;
use anyhow::Result;

/// Upper bound on lint/repair cycles
pub const MAX_REPAIR_PASSES: usize = 10;

/// Validate option values beyond what the schema checks
///
/// # Errors
///
/// Returns an error if:
/// - `indent_step` or `tab_size` is zero
/// - A constraint keyword is blank
/// - The values basename is empty or contains a path separator
/// - `repair_passes` exceeds [`MAX_REPAIR_PASSES`]
#[inline]
pub fn validate_options(options: &Options) -> Result<()> {
    if options.indent_step == 0 {
        return Err(GraftError::configuration("indent_step must be at least 1").into());
    }

    if options.tab_size == 0 {
        return Err(GraftError::configuration("tab_size must be at least 1").into());
    }

    for (index, keyword) in options.constraint_keywords.iter().enumerate() {
        if keyword.trim().is_empty() {
            return Err(GraftError::configuration(format!(
                "Constraint keyword #{} cannot be empty",
                index + 1
            ))
            .into());
        }
    }

    validate_values_basename(&options.chart_values_basename)?;

    if options.repair_passes > MAX_REPAIR_PASSES {
        return Err(GraftError::configuration(format!(
            "repair_passes must be at most {MAX_REPAIR_PASSES}, got {}",
            options.repair_passes
        ))
        .into());
    }

    Ok(())
}

/// Validate the values file basename
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The name contains `/` or `\`
#[inline]
pub fn validate_values_basename(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GraftError::configuration("chart_values_basename cannot be empty").into());
    }

    if name.contains(['/', '\\']) {
        return Err(GraftError::configuration(format!(
            "chart_values_basename must be a file name, not a path: '{name}'"
        ))
        .into());
    }

    Ok(())
}
