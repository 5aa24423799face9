//! Netsketch CLI - terminal front end for the diagram studio
//!
//! `generate` renders every style variant of a sketch into a directory;
//! `session` keeps a studio open for selecting and editing variants.

#![allow(missing_docs)]

pub mod credentials;
pub mod files;
pub mod session;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use credentials::InteractiveCredentials;
use netsketch_core::{DiagramStudio, StudioConfig, StudioError};
use netsketch_gemini::GeminiClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line definition
#[must_use]
pub fn cli() -> Command {
    Command::new("netsketch")
        .version(netsketch_core::VERSION)
        .about("Turn hand-drawn network sketches into clean diagrams")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .global(true)
                .help("Override the image model"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Log filter when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("generate")
                .about("Render all style variants of a sketch")
                .arg(sketch_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value("diagrams")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for the rendered variants"),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Interactive generate/select/edit session")
                .arg(sketch_arg().required(false)),
        )
}

fn sketch_arg() -> Arg {
    Arg::new("sketch")
        .long("sketch")
        .required(true)
        .help("Sketch image path (PNG, JPEG, WebP) or data: URL")
}

/// Resolve configuration from `--config` and `--model`
///
/// # Errors
/// Fails when the config file cannot be loaded or is invalid.
pub fn load_config(matches: &ArgMatches) -> Result<StudioConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => StudioConfig::new(),
    };
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.as_str());
    }
    config.validate()?;
    Ok(config)
}

/// Studio wired to the Gemini backend and terminal key selection
///
/// # Errors
/// Fails when the HTTP client cannot be built.
pub fn build_studio(config: StudioConfig) -> Result<DiagramStudio> {
    let credentials = Arc::new(InteractiveCredentials::from_env(&config.api_key_var));
    let generator = Arc::new(GeminiClient::new(&config, credentials.clone())?);
    Ok(DiagramStudio::new(config, generator, credentials))
}

/// Dispatch a parsed command line
///
/// # Errors
/// Any failure that should end the process with a non-zero status.
pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    tracing::debug!(?config, "resolved config");
    let studio = build_studio(config)?;

    match matches.subcommand() {
        Some(("generate", args)) => {
            let sketch = args
                .get_one::<String>("sketch")
                .context("missing --sketch")?;
            let out = required_path(args, "out")?;
            generate(&studio, sketch, out).await
        }
        Some(("session", args)) => {
            if let Some(sketch) = args.get_one::<String>("sketch") {
                studio.upload(files::load_sketch(sketch)?);
            }
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session::run(&studio, stdin).await
        }
        _ => Ok(()),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

/// One-shot batch: upload, generate, write results
///
/// # Errors
/// Fails when the sketch cannot be read, no key can be selected, or no
/// variant succeeded.
pub async fn generate(studio: &DiagramStudio, sketch: &str, out: &Path) -> Result<()> {
    studio.upload(files::load_sketch(sketch)?);
    studio.ensure_credential().await?;

    let report = match studio.generate_all().await {
        Ok(Some(report)) => report,
        Ok(None) => anyhow::bail!("generation did not start"),
        Err(StudioError::MissingCredential) => {
            anyhow::bail!("no API key; set {}", studio.config().api_key_var)
        }
        Err(e) => return Err(e.into()),
    };

    for path in files::save_variants(&studio.snapshot(), out)? {
        println!("wrote {}", path.display());
    }
    for (id, error) in &report.failed {
        eprintln!("{id} failed: {error}");
    }
    if report.succeeded.is_empty() {
        anyhow::bail!("every variant failed");
    }
    Ok(())
}
