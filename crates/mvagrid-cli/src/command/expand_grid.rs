use std::path::PathBuf;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExpandGridArg {
    /// Study configuration file
    #[arg(long)]
    config: PathBuf,
    /// Mass range selecting the sample list
    #[arg(long)]
    range: String,
    /// Number of variables, appended to the range to select the MVA setup
    #[arg(long)]
    number_variables: u32,
}

pub(crate) fn run(arg: &ExpandGridArg) -> anyhow::Result<()> {
    let config = util::read_config_file(&arg.config)?;
    let selection = config.select(&arg.range, arg.number_variables)?;
    let grid = selection.grid()?;
    eprintln!("Setup {}: {} grid points", selection.name, grid.len());
    for point in grid.expand() {
        println!("{}\t{}", point.name, point.config_string());
    }
    Ok(())
}
