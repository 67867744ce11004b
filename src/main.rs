//! # `odb-config`
//!
//! Renders the effective configuration of one job of an on-demand service
//! broker release.
//!
//! ## Usage
//!
//! ```sh
//! odb-config --job broker --manifest manifest.yml --links links.yml
//! odb-config --job broker --manifest manifest.yml --indicators --deployment my-broker
//! ```
//!
//! The document goes to stdout; logs go to stderr. Exit status is 1 for
//! unusable input and 2 when the configuration breaks a rule of the job.

use anyhow::Error;
use clap::Parser as _;
use odb_config::cli::Args;
use odb_config::error::{InputError, ValidationError};
use odb_config::system::RealSystem;
use std::io;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    match odb_config::run(&args, &system) {
        Ok(document) => {
            print!("{document}");
            if !document.ends_with('\n') {
                println!();
            }
            std::process::exit(0);
        }
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(exit_code(&err));
        }
    }
}

fn exit_code(err: &Error) -> i32 {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return validation.exit_code();
    }
    err.downcast_ref::<InputError>()
        .map_or(1, InputError::exit_code)
}
