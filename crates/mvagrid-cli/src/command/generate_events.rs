use std::{collections::BTreeMap, path::PathBuf};

use mvagrid_dataset::{
    category::SampleId,
    feature::Feature,
    sample::{MassRange, SampleEntry},
};
use mvagrid_training::grid::{GridAxis, ParamValue};
use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution as _, Normal};
use rand_pcg::Pcg32;

use crate::{
    schema::{
        config::{MvaSetup, SampleList, StudyConfig},
        events::{EventFile, EventRecord},
    },
    util::{self, Output},
};

const CHANNELS: [&str; 2] = ["eTau", "muTau"];
const SIGNAL_MASSES: [u32; 2] = [300, 500];
const N_SPLITS: u32 = 2;
const RANGE: &str = "low";
const VARIABLES: [&str; 3] = ["pt", "eta", "m_vis"];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateEventsArg {
    /// Directory the sample files and the study config are written to
    #[arg(long)]
    output_dir: PathBuf,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of events per signal sample, background gets ten times as many
    #[arg(long, default_value_t = 2000)]
    events: usize,
}

/// Feature distributions of one toy sample.
struct ToyShape {
    pt: Normal<f64>,
    eta: Normal<f64>,
    m_vis: Normal<f64>,
}

impl ToyShape {
    fn signal(mass: u32) -> anyhow::Result<Self> {
        let mass = f64::from(mass);
        Ok(Self {
            pt: Normal::new(0.4 * mass, 0.1 * mass)?,
            eta: Normal::new(0.0, 1.0)?,
            m_vis: Normal::new(0.8 * mass, 0.1 * mass)?,
        })
    }

    fn background() -> anyhow::Result<Self> {
        Ok(Self {
            pt: Normal::new(60.0, 30.0)?,
            eta: Normal::new(0.0, 1.5)?,
            m_vis: Normal::new(150.0, 80.0)?,
        })
    }

    fn generate<R>(&self, num_events: usize, rng: &mut R) -> EventFile
    where
        R: Rng,
    {
        let mut events = Vec::with_capacity(num_events);
        for event_id in (0_u64..).take(num_events) {
            let channel = CHANNELS[rng.random_range(0..CHANNELS.len())];
            let split_id = rng.random_range(0..N_SPLITS);
            let features = vec![
                Feature::new("pt", self.pt.sample(rng).abs()),
                Feature::new("eta", self.eta.sample(rng)),
                Feature::new("m_vis", self.m_vis.sample(rng).abs()),
            ];
            events.push(EventRecord {
                event_id: Some(event_id),
                channel: channel.to_owned(),
                split_id,
                features,
            });
        }
        EventFile {
            n_splits: N_SPLITS,
            events,
        }
    }
}

pub(crate) fn run(arg: &GenerateEventsArg) -> anyhow::Result<()> {
    let GenerateEventsArg {
        output_dir,
        seed,
        events,
    } = arg;

    util::create_dir(output_dir)?;
    let mut rng = Pcg32::seed_from_u64(*seed);

    let mut samples = vec![];
    for mass in SIGNAL_MASSES {
        let entry = SampleEntry {
            file: format!("signal_M{mass}.json").into(),
            id: SampleId::Signal { mass },
            spin: Some(0),
            weight: 1.0,
            sample_weight: None,
        };
        samples.push((entry, ToyShape::signal(mass)?, *events));
    }
    samples.push((
        SampleEntry {
            file: "background.json".into(),
            id: SampleId::BackgroundAll,
            spin: None,
            weight: 0.1,
            sample_weight: None,
        },
        ToyShape::background()?,
        events * 10,
    ));

    let mut files = vec![];
    for (entry, shape, num_events) in samples {
        let file = shape.generate(num_events, &mut rng);
        let mut output = Output::create(output_dir.join(&entry.file))?;
        output.write_json(&file)?;
        eprintln!("Wrote {num_events} {} events to {output}", entry.id);
        files.push(entry);
    }

    let config = study_config(files);
    let config_path = output_dir.join("study.json");
    Output::save_json(&config, Some(config_path.clone()))?;
    eprintln!("Wrote study config to {}", config_path.display());
    eprintln!(
        "Run with: mvagrid train --config {} --input-dir {} --range {RANGE} --number-variables {} --which-test 0",
        config_path.display(),
        output_dir.display(),
        VARIABLES.len()
    );
    Ok(())
}

fn study_config(files: Vec<SampleEntry>) -> StudyConfig {
    let setup = MvaSetup {
        variables: Some(VARIABLES.iter().map(|&v| v.to_owned()).collect()),
        use_mass_var: true,
        mass_range: MassRange { min: 250, max: 600 },
        sample_weight: 1.0,
        channels: CHANNELS.iter().map(|&c| c.to_owned()).collect(),
        grid: vec![
            GridAxis::new("NTrees", vec![ParamValue::Int(20), ParamValue::Int(100)]),
            GridAxis::new(
                "Shrinkage",
                vec![ParamValue::Float(0.1), ParamValue::Float(0.5)],
            ),
        ],
        background_points: None,
    };
    StudyConfig {
        samples: BTreeMap::from([(RANGE.to_owned(), SampleList { files })]),
        setups: BTreeMap::from([(format!("{RANGE}{}", VARIABLES.len()), setup)]),
    }
}
