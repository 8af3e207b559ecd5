//! OpenAPI Annotation Generator - Command-line tool for generating OpenAPI
//! documentation from annotated route handlers.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation into the configured output directory:
//! ```bash
//! openapi-from-annotations ./my-api-project
//! ```
//!
//! Generate YAML documentation to an explicit directory:
//! ```bash
//! openapi-from-annotations ./my-api-project -f yaml -o docs
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-annotations ./my-api-project -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse before logger init so the verbose flag can pick the level.
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI Annotation Generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
