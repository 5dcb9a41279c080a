use std::io::{self, Write};

use clap::Parser;

use crate::report::{ReportSummary, report_files};
use crate::runtime::{AppContext, Result};

use super::types::Cli;

pub fn run_cli() -> std::result::Result<(), String> {
    let cli = Cli::parse();
    let app = AppContext::new();
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(&app, &cli, &mut stdout.lock(), &mut stderr.lock())
        .map(|_| ())
        .map_err(|error| error.to_string())
}

/// Runs the report for parsed arguments. Per-file failures are written to
/// `err` and do not fail the run.
pub fn run_with<W: Write, E: Write>(
    app: &AppContext,
    cli: &Cli,
    out: &mut W,
    err: &mut E,
) -> Result<ReportSummary> {
    let mut store = app.store();
    let summary = report_files(&mut store, &cli.files, cli.report_options(), out, err)?;
    out.flush()?;
    Ok(summary)
}
