use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::annotation::{AnnotationParser, RouteDescriptor};
use crate::config::DocConfig;
use crate::openapi_builder::OpenApiBuilder;
use crate::parser::AstParser;
use crate::resolver::SourceResolver;
use crate::response::{NullResponseResolver, ResponseResolver};
use crate::scanner::SourceScanner;
use crate::serializer::{self, OutputFormat};

/// OpenAPI Annotation Generator - Generate OpenAPI documentation from annotated handlers
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Configuration file (defaults to <PROJECT_PATH>/idoc.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: CliFormat,

    /// Output directory (overrides the configured one; `-` for stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Load the configuration with the route list
    let config_path = args
        .config_path
        .clone()
        .unwrap_or_else(|| args.project_path.join("idoc.toml"));
    let config = DocConfig::load(&config_path)?;
    info!("Loaded {} routes from {}", config.routes.len(), config_path.display());

    if config.routes.is_empty() {
        warn!("No routes configured; the generated document will be empty");
    }

    // Step 2: Scan and parse the project sources
    info!("Scanning project directory...");
    let scanner = SourceScanner::new(args.project_path.clone());
    let source_files = scanner.scan()?;
    info!("Found {} Rust files", source_files.len());

    let parsed_files = AstParser::parse_files(&source_files);
    info!("Successfully parsed {} files", parsed_files.len());

    // Step 3: Process every configured route
    let resolver = SourceResolver::new(parsed_files);
    let annotation_parser = AnnotationParser::new(&resolver);
    let responder = NullResponseResolver;

    let routes = process_routes(&annotation_parser, &config, &responder)?;
    info!("Documented {} routes", routes.len());

    // Step 4: Assemble and serialize the document
    info!("Building OpenAPI document...");
    let document = OpenApiBuilder::new(&config).build(&routes);

    let format = OutputFormat::from(args.output_format);
    let content = serializer::serialize(&document, format)?;

    // Step 5: Write the artifact
    let output_dir = args
        .output_path
        .clone()
        .unwrap_or_else(|| args.project_path.join(&config.output));
    if output_dir.as_os_str() == "-" {
        println!("{}", content);
    } else {
        let path = output_dir.join(format.file_name());
        serializer::write_to_file(&content, &path)?;
    }

    info!("Generation complete!");
    Ok(())
}

/// Runs the annotation parser over the configured route list. Skippable
/// routes are dropped with a warning; authoring errors abort the run.
pub fn process_routes(
    parser: &AnnotationParser,
    config: &DocConfig,
    responder: &dyn ResponseResolver,
) -> Result<Vec<RouteDescriptor>> {
    let mut routes = Vec::new();
    for record in &config.routes {
        match parser.process_route(record, responder)? {
            Some(descriptor) => {
                info!(
                    "Processed route: [{}] {}",
                    descriptor.methods.join(","),
                    descriptor.uri
                );
                routes.push(descriptor);
            }
            None => debug!("Route {} produced no documentation", record.uri),
        }
    }
    Ok(routes)
}
