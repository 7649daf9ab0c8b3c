//! CLI definitions for the layerconf binary.
//!
//! Thin clap derive layer; all behavior lives in the library. CLI enums
//! are mapped to library types so clap stays out of the core modules.

use crate::error::OnError;
use crate::merge::ListStrategy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Layered configuration resolution
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, merge, and resolve configuration sources, printing the result
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Source file (repeatable; later files take precedence)
    #[arg(short = 'f', long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Default section to serve (and to print)
    #[arg(long)]
    pub section: Option<String>,

    /// How sequences at the same keypath combine
    #[arg(long, value_enum, default_value_t)]
    pub list_strategy: ListStrategyArg,

    /// Downgrade policy for loading and placeholder failures
    #[arg(long, value_enum, default_value_t)]
    pub on_error: OnErrorArg,

    /// Context override, VAR=VALUE (repeatable; wins over environment)
    #[arg(long = "set", value_name = "VAR=VALUE", value_parser = parse_var)]
    pub set: Vec<(String, String)>,

    /// Print only the sub-tree at this keypath
    #[arg(long)]
    pub get: Option<String>,

    /// Maximum transitive hops per reference chain
    #[arg(long)]
    pub max_ref_depth: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListStrategyArg {
    #[default]
    Replace,
    Append,
    UniqueAppend,
}

impl From<ListStrategyArg> for ListStrategy {
    fn from(arg: ListStrategyArg) -> Self {
        match arg {
            ListStrategyArg::Replace => ListStrategy::Replace,
            ListStrategyArg::Append => ListStrategy::Append,
            ListStrategyArg::UniqueAppend => ListStrategy::UniqueAppend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OnErrorArg {
    #[default]
    Raise,
    Ignore,
    Warn,
}

impl From<OnErrorArg> for OnError {
    fn from(arg: OnErrorArg) -> Self {
        match arg {
            OnErrorArg::Raise => OnError::Raise,
            OnErrorArg::Ignore => OnError::Ignore,
            OnErrorArg::Warn => OnError::Warn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected VAR=VALUE, got '{raw}'")),
    }
}
