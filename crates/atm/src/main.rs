//! `atm`: the Metacrafters ATM in your terminal.

#[macro_use]
extern crate tracing;

use args::Atm;
use clap::Parser;
use eyre::Result;

mod args;
mod cmd;
mod handler;
mod opts;
mod ui;
mod utils;

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    utils::enable_paint();
    let args = Atm::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Atm) -> Result<()> {
    let config = args.opts.load_config()?;
    trace!(?config, "loaded config");
    cmd::run(args.cmd.unwrap_or(args::AtmSubcommand::Ui), config).await
}
