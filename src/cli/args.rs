use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ddcrt_types::GenericVariance;

/// CLI arguments for the ddcrt binary.
#[derive(Parser, Debug)]
#[command(
    name = "ddcrt",
    version,
    about = "Evaluate type queries against a manifest of generated classes"
)]
pub struct CliArgs {
    /// Manifest describing declarations and queries.
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Output format for query results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Override the manifest's generic variance.
    #[arg(long, value_enum)]
    pub variance: Option<Variance>,

    /// Whether surplus required parameters may fill optional positional slots.
    #[arg(
        long = "requiredFillsOptional",
        alias = "required-fills-optional",
        value_name = "BOOL"
    )]
    pub required_fills_optional: Option<bool>,

    /// Log every generic cache miss at debug level.
    #[arg(long = "traceInstantiations", alias = "trace-instantiations")]
    pub trace_instantiations: bool,

    /// Exit with status 1 when any query reports an error.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Variance {
    Invariant,
    Covariant,
}

impl Variance {
    pub fn to_generic_variance(self) -> GenericVariance {
        match self {
            Variance::Invariant => GenericVariance::Invariant,
            Variance::Covariant => GenericVariance::Covariant,
        }
    }
}
