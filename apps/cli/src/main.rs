//! docenrich CLI: prepare technical documents for knowledge-graph ingestion.
//!
//! Normalizes and scores document metadata, resolves canonical entities, and
//! prints the ingestion and graph-build payloads as JSON.

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
