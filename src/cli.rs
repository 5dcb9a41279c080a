mod runner;
mod types;


pub use runner::{run_cli, run_with};
pub use types::Cli;
