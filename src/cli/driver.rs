//! Load a manifest, apply command-line overrides and evaluate it.

use anyhow::Result;
use tracing::debug;

use crate::RuntimeOptions;
use crate::cli::args::CliArgs;
use crate::manifest::{Manifest, Report};

/// Options from the manifest, with flags given on the command line taking
/// precedence.
pub fn resolve_options(manifest: &Manifest, args: &CliArgs) -> RuntimeOptions {
    let mut options = manifest.options;
    if let Some(variance) = args.variance {
        options.generic_variance = variance.to_generic_variance();
    }
    if let Some(lenient) = args.required_fills_optional {
        options.required_fills_optional = lenient;
    }
    if args.trace_instantiations {
        options.trace_instantiations = true;
    }
    options
}

pub fn run(args: &CliArgs) -> Result<Report> {
    let manifest = Manifest::load(&args.manifest)?;
    let options = resolve_options(&manifest, args);
    debug!(manifest = %args.manifest.display(), ?options, "evaluating manifest");
    manifest.evaluate_with(options)
}
