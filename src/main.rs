mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    memviz_utils::init_logging(cli.global.verbose);

    match &cli.command {
        Command::Layout { path } => commands::layout(path, &cli.global),
        Command::Optimize { path } => commands::optimize(path, &cli.global),
        Command::Cache { path } => commands::cache(path, &cli.global),
        Command::Export { path, output } => {
            commands::export(path, output.as_deref(), &cli.global)
        }
        Command::Types => commands::types(&cli.global),
    }
}
