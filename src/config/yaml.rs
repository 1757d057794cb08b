//! Options file discovery and parsing

use crate::config::Options;
use crate::error::GraftError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options file looked up in the working directory
pub const LOCAL_OPTIONS_FILE: &str = "valuegraft.yaml";

/// Find the options file to use.
///
/// An explicit path must exist. Otherwise `./valuegraft.yaml`, then
/// `<config dir>/valuegraft/config.yaml`; `None` when neither exists.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit path was given and does not exist
/// - The working directory cannot be determined
#[inline]
pub fn discover_options_file(system: &dyn System, explicit: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        if !system.is_file(&path) {
            return Err(GraftError::configuration(format!(
                "Options file not found: {}",
                path.display()
            ))
            .into());
        }
        return Ok(Some(path));
    }

    let local = system
        .current_dir()
        .context("Failed to determine working directory")?
        .join(LOCAL_OPTIONS_FILE);
    if system.is_file(&local) {
        return Ok(Some(local));
    }

    if let Some(config_dir) = system.config_dir() {
        let user = config_dir.join("valuegraft").join("config.yaml");
        if system.is_file(&user) {
            return Ok(Some(user));
        }
    }

    Ok(None)
}

/// Load options: defaults, overlaid by the discovered options file
///
/// # Errors
///
/// Returns an error if:
/// - An explicit options file does not exist
/// - The options file cannot be read, parsed or validated
#[inline]
pub fn load_options(system: &dyn System, explicit: Option<&str>) -> Result<Options> {
    match discover_options_file(system, explicit)? {
        Some(path) => {
            debug!("Loading options from {}", path.display());
            load_options_file(system, &path)
        }
        None => {
            debug!("No options file found, using defaults");
            Ok(Options::default())
        }
    }
}

/// Load and validate one options file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file is not valid YAML or does not match the options schema
/// - An option has an invalid value
#[inline]
pub fn load_options_file(system: &dyn System, path: &Path) -> Result<Options> {
    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read options file: {}", path.display()))?;
    parse_options(&content)
        .map_err(|err| GraftError::configuration(format!("{}: {err:#}", path.display())).into())
}

/// Parse options from YAML text, validating shape then values
///
/// # Errors
///
/// Returns an error if:
/// - The text is not valid YAML
/// - The document does not match the options schema
/// - An option has an invalid value
#[inline]
pub fn parse_options(content: &str) -> Result<Options> {
    let document: serde_json::Value = if content.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_yaml::from_str(content).context("Failed to parse YAML options")?
    };
    let document = match document {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other,
    };

    crate::config::schema::validate_against_schema(&document)
        .context("Options do not match the schema")?;

    let options: Options =
        serde_json::from_value(document).context("Failed to read options")?;

    crate::config::validation::validate_options(&options)?;
    Ok(options)
}
