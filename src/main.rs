//! # `ValueGraft`
//!
//! Uncomments the parameters of a commented YAML configuration template that
//! a product actually knows, re-indenting them after the product's parameter
//! model, and lints the result.
//!
//! ## Usage
//!
//! ```sh
//! valuegraft --template values.template.yaml --charts ./charts --catalog params.json -o values.yaml
//! ```
//!
//! The transformed document goes to stdout unless `--output` is given; logs
//! go to stderr. A run that leaves lint errors in the output exits with 6.

use clap::Parser as _;
use std::io;
use valuegraft::cli::Args;
use valuegraft::error::{GraftError, PARTIAL_SUCCESS_EXIT_CODE};
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match valuegraft::run(&args) {
        Ok(summary) if summary.is_clean() => std::process::exit(0),
        Ok(summary) => {
            warn!("Output has {} lint errors", summary.lint_errors);
            std::process::exit(PARTIAL_SUCCESS_EXIT_CODE);
        }
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<GraftError>()
                    .map_or(1, GraftError::exit_code),
            );
        }
    }
}
