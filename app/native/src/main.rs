#![allow(clippy::multiple_crate_versions)]

//! Zonesnap command-line entry point.
//!
//! Logging goes to stderr and is controlled by `ZONESNAP_LOG`
//! (e.g. `ZONESNAP_LOG=zonesnap_lib=debug`), defaulting to warnings only.

use tracing_subscriber::EnvFilter;
use zonesnap_lib::constants::LOG_ENV_VAR;

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(err) = zonesnap_lib::cli::run() {
        eprintln!("zonesnap: {err}");
        std::process::exit(1);
    }
}
