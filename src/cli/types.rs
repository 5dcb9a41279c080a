use std::path::PathBuf;

use clap::Parser;

use crate::report::ReportOptions;

#[derive(Debug, Parser)]
#[command(
    name = "iinfo",
    version,
    about = "Print a summary of image files",
    override_usage = "iinfo [options] [FILE...]"
)]
pub struct Cli {
    /// Verbose output
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Sum the image sizes
    #[arg(short = 's')]
    pub sum: bool,

    /// Print each image spec as a JSON object
    #[arg(long)]
    pub json: bool,

    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            verbose: self.verbose,
            sum: self.sum,
            json: self.json,
        }
    }
}
