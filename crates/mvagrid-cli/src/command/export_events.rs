use std::path::PathBuf;

use mvagrid_dataset::dataset::Dataset;

use super::ingest::{self, IngestArg};
use crate::{
    schema::report::{DumpedEvent, EventDump},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportEventsArg {
    #[clap(flatten)]
    ingest: IngestArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ExportEventsArg) -> anyhow::Result<()> {
    let ExportEventsArg { ingest: input, output } = arg;

    let config = ingest::read_config(input)?;
    let selection = config.select(&input.range, input.number_variables)?;
    eprintln!("Reading events for setup {}...", selection.name);
    let dataset = ingest::load_dataset(input, &selection)?;

    let events = dump_events(&dataset);
    eprintln!("Exporting {} events", events.len());
    let dump = EventDump {
        run: input.run_info(&selection, &dataset),
        feature_names: dataset.feature_names().to_vec(),
        events,
    };
    Output::save_json(&dump, output.clone())?;
    Ok(())
}

fn dump_events(dataset: &Dataset) -> Vec<DumpedEvent> {
    dataset
        .buckets()
        .flat_map(|(fold, key, bucket)| {
            bucket.events.iter().map(move |event| (fold, key, event))
        })
        .enumerate()
        .map(|(index, (fold, key, event))| DumpedEvent {
            index,
            fold,
            category: key.clone(),
            class: key.class(),
            features: event.features.clone(),
            weight: event.weight,
        })
        .collect()
}
