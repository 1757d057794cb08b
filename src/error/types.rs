//! Custom error types with exit codes

use thiserror::Error;

/// Exit code for a run that completed but left lint errors in the output
pub const PARTIAL_SUCCESS_EXIT_CODE: i32 = 6;

/// Main error type for valuegraft operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GraftError {
    /// Configuration Error - missing or invalid options
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input Error - the template could not be read or processed
    #[error("Input error: {message}")]
    Input { message: String },

    /// Output Error - the transformed document could not be written
    #[error("Output error: {message}")]
    Output { message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl GraftError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Input { .. } => 2,
            Self::Output { .. } => 3,
            Self::Filesystem { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an input error
    #[inline]
    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create an output error
    #[inline]
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}
