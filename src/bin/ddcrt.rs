#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;

use ddcrt::cli::args::CliArgs;
use ddcrt::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_QUERY_ERRORS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if DDCRT_LOG or RUST_LOG is set (zero cost otherwise).
    // Supports DDCRT_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    ddcrt::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let report = driver::run(&args)?;
    let output = Reporter::new(args.format).render(&report)?;
    print!("{output}");

    let errors = report.error_count();
    if errors > 0 {
        eprintln!("{errors} quer{} failed", if errors == 1 { "y" } else { "ies" });
    }
    let code = if args.strict && errors > 0 {
        EXIT_QUERY_ERRORS
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(code);
}
