use clap::{Parser, Subcommand};

use self::{
    expand_grid::ExpandGridArg, export_events::ExportEventsArg,
    generate_events::GenerateEventsArg, train::TrainArg,
};

mod expand_grid;
mod export_events;
mod generate_events;
mod ingest;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train and evaluate every grid point of an MVA setup
    Train(#[clap(flatten)] TrainArg),
    /// Write the accumulated events instead of training
    ExportEvents(#[clap(flatten)] ExportEventsArg),
    /// List the grid points of an MVA setup
    ExpandGrid(#[clap(flatten)] ExpandGridArg),
    /// Generate toy sample files and a matching study config
    GenerateEvents(#[clap(flatten)] GenerateEventsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::ExportEvents(arg) => export_events::run(&arg)?,
        Mode::ExpandGrid(arg) => expand_grid::run(&arg)?,
        Mode::GenerateEvents(arg) => generate_events::run(&arg)?,
    }
    Ok(())
}
