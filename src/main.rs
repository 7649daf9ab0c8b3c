//! layerconf CLI
//!
//! Loads one or more configuration sources, merges them, resolves
//! placeholders and references, and prints the result.

use anyhow::Result;
use clap::Parser;
use layerconf::cli::{Cli, Command, OutputFormat, ResolveArgs};
use layerconf::merge::MergePolicy;
use layerconf::pipeline::Pipeline;
use layerconf::placeholder::ResolutionContext;
use layerconf::source::SourceDescriptor;
use std::fs::OpenOptions;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

/// Environment variable naming an extra highest-precedence source file.
const CONFIG_ENV_VAR: &str = "LAYERCONF_CONFIG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Command::Resolve(args) => run_resolve(args),
    }
}

fn run_resolve(args: ResolveArgs) -> Result<()> {
    let mut pipeline = Pipeline::new()
        .merge_policy(MergePolicy::with_list_strategy(args.list_strategy.into()))
        .on_error(args.on_error.into());

    for file in &args.files {
        pipeline = pipeline.source(SourceDescriptor::file(file));
    }

    // Explicit config from the environment is the highest-precedence source.
    if let Ok(extra) = std::env::var(CONFIG_ENV_VAR) {
        if !extra.trim().is_empty() {
            debug!(path = %extra, "Adding source from {}", CONFIG_ENV_VAR);
            pipeline = pipeline.source(SourceDescriptor::file(extra));
        }
    }

    let mut context = ResolutionContext::from_env();
    for (name, value) in &args.set {
        context = context.with_var(name, value);
    }
    pipeline = pipeline.context(context);

    if let Some(ref section) = args.section {
        pipeline = pipeline.default_section(section);
    }
    if let Some(max_depth) = args.max_ref_depth {
        pipeline = pipeline.max_ref_depth(max_depth);
    }

    let view = pipeline.load()?;

    let selected = match args.get {
        Some(ref keypath) => view.get(keypath)?,
        None => view.section(None)?,
    };

    match args.output {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(selected)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(selected)?),
    }

    Ok(())
}
