//! CLI entry point for grid rule induction

use clap::Parser;
use gridrule::io::cli::{BatchSummary, Cli, TaskProcessor};
use gridrule::io::logging::init_tracing;

fn main() -> gridrule::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    let mut processor = TaskProcessor::new(cli);
    let summary = processor.process()?;

    if !quiet {
        report(&summary);
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn report(summary: &BatchSummary) {
    eprintln!("{summary}");
}
