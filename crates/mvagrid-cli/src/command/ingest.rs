use std::path::PathBuf;

use anyhow::Context;
use mvagrid_dataset::{
    assign::BackgroundAssigner,
    dataset::{Dataset, DatasetBuilder, IncomingEvent},
    feature::FeatureLayout,
    fold::{Fold, FoldPair},
    random::{self, DrawStream, RunSeeds},
    split::{Blinding, DEFAULT_NUMBER_SETS, FoldSplitter},
};

use crate::{
    schema::{
        config::{Selection, StudyConfig},
        report::RunInfo,
    },
    util,
};

/// Options selecting and reading the events of a study.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct IngestArg {
    /// Study configuration file
    #[arg(long)]
    pub config: PathBuf,
    /// Directory sample file paths are relative to
    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,
    /// Mass range selecting the sample list
    #[arg(long)]
    pub range: String,
    /// Number of variables, appended to the range to select the MVA setup
    #[arg(long)]
    pub number_variables: u32,
    /// Set held out for testing
    #[arg(long)]
    pub which_test: u32,
    /// Number of sets events are spread over
    #[arg(long, default_value_t = DEFAULT_NUMBER_SETS)]
    pub number_sets: u32,
    /// Master random seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Maximum number of events read per sample file
    #[arg(long)]
    pub number_events: Option<usize>,
    /// Read the unblinded half of the events
    #[arg(long)]
    pub unblind: bool,
    /// Draw from per-event random streams, independent of reading order
    #[arg(long)]
    pub per_event_streams: bool,
}

impl IngestArg {
    fn stream(&self, seed: u64) -> DrawStream {
        if self.per_event_streams {
            DrawStream::per_event(seed)
        } else {
            DrawStream::sequential(seed)
        }
    }

    fn blinding(&self) -> Blinding {
        if self.unblind {
            Blinding::Unblind
        } else {
            Blinding::Blind
        }
    }

    pub fn run_info(&self, selection: &Selection<'_>, dataset: &Dataset) -> RunInfo {
        RunInfo {
            created_at: chrono::Utc::now(),
            setup: selection.name.to_owned(),
            seed: self.seed,
            number_sets: self.number_sets,
            which_test: self.which_test,
            unblind: self.unblind,
            num_events: FoldPair {
                training: dataset.num_events_of(Fold::Training),
                testing: dataset.num_events_of(Fold::Testing),
            },
        }
    }
}

pub(crate) fn read_config(arg: &IngestArg) -> anyhow::Result<StudyConfig> {
    util::read_config_file(&arg.config)
}

/// Reads every selected sample file into a frozen dataset.
pub(crate) fn load_dataset(arg: &IngestArg, selection: &Selection<'_>) -> anyhow::Result<Dataset> {
    let setup = selection.setup;
    let seeds = RunSeeds::from_master(arg.seed);
    let assigner = BackgroundAssigner::new(selection.working_points()?, arg.stream(seeds.assignment))?;
    let mut splitter = FoldSplitter::new(arg.number_sets, arg.which_test, arg.stream(seeds.split))?;
    let blinding = arg.blinding();
    tracing::info!(
        setup = selection.name,
        working_points = assigner.points().len(),
        which_test = splitter.which_test(),
        ?blinding,
        "reading events"
    );

    let layout = FeatureLayout::new(setup.variables.clone(), setup.use_mass_var);
    let mut builder = DatasetBuilder::new(layout, assigner).with_channels(setup.channels.clone());
    for entry in selection.samples() {
        let path = arg.input_dir.join(&entry.file);
        let file = util::read_events_file(&path)?;
        let source = entry.file.to_string_lossy();
        let sample_weight = entry.sample_weight.unwrap_or(setup.sample_weight);

        let mut accepted = 0;
        for (position, record) in (0_u64..).zip(&file.events) {
            if arg.number_events.is_some_and(|max| accepted >= max) {
                break;
            }
            if !blinding.accepts(record.split_id, file.n_splits)
                || !setup.accepts_channel(&record.channel)
            {
                continue;
            }
            let event_key = random::event_key(&source, record.event_id.unwrap_or(position));
            let fold = splitter.assign(event_key);
            builder
                .add_event(IncomingEvent {
                    event_key,
                    fold,
                    features: &record.features,
                    sample: entry.id,
                    spin: entry.spin,
                    channel: &record.channel,
                    weight: entry.weight,
                    sample_weight,
                })
                .with_context(|| {
                    format!("Invalid event {accepted} in {}", path.display())
                })?;
            accepted += 1;
        }
        tracing::info!(file = %path.display(), sample = %entry.id, accepted, "sample read");
    }
    Ok(builder.build())
}
