use std::path::PathBuf;

use mvagrid_dataset::category::{CategoryKey, Channel, SampleId, Spin};
use mvagrid_evaluation::{report::ReportRow, study};
use mvagrid_training::stumps::BoostedStumpTrainer;

use super::ingest::{self, IngestArg};
use crate::{schema::report::StudyReport, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    ingest: IngestArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg { ingest: input, output } = arg;

    let config = ingest::read_config(input)?;
    let selection = config.select(&input.range, input.number_variables)?;
    let points = selection
        .grid()?
        .expand()
        .into_iter()
        .map(|p| p.with_suffix(input.which_test))
        .collect::<Vec<_>>();

    eprintln!("Reading events for setup {}...", selection.name);
    let dataset = ingest::load_dataset(input, &selection)?;
    eprintln!(
        "Read {} events with {} features",
        dataset.num_events(),
        dataset.feature_names().len()
    );

    eprintln!("Training {} grid points...", points.len());
    let outcome = study::run_study(&BoostedStumpTrainer, &dataset, &points)?;
    print_summary(&outcome.rows);

    let report = StudyReport {
        run: input.run_info(&selection, &dataset),
        feature_names: dataset.feature_names().to_vec(),
        rows: outcome.rows,
        feature_stability: outcome.feature_stability,
        excluded_categories: outcome.excluded_categories,
    };
    Output::save_json(&report, output.clone())?;
    Ok(())
}

fn print_summary(rows: &[ReportRow]) {
    let inclusive = CategoryKey::new(Channel::Any, SampleId::AnyMass, Spin::Any);
    let width = rows.iter().map(|r| r.config.len()).max().unwrap_or(0);
    eprintln!();
    eprintln!("{:<width$}  {:>12}  {:>8}  top feature", "config", "significance", "cut");
    for row in rows {
        if !row.is_trained() {
            eprintln!("{:<width$}  failed", row.config);
            continue;
        }
        let (significance, cut) = row
            .significance_of(&inclusive)
            .map_or(("-".to_owned(), "-".to_owned()), |r| {
                (
                    format!("{:.3}±{:.3}", r.significance, r.significance_error),
                    format!("{:.3}", r.cut),
                )
            });
        let top = row.features.first().map_or("-", |f| f.name.as_str());
        eprintln!("{:<width$}  {significance:>12}  {cut:>8}  {top}", row.config);
    }
}
