//! edutrace CLI: education history extraction from CV text.
//!
//! Reads already-normalized CV text files, extracts degree records, and
//! prints them as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
