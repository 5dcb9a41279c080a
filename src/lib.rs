pub mod cli;
pub mod config;
pub mod display;
pub mod formats;
pub mod model;
pub mod report;
pub mod runtime;
pub mod store;
pub mod viewer;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
