use std::{num::NonZeroUsize, thread};

use mvagrid_dataset::{
    balance::{self, TrainingSet},
    category::CategoryKey,
    dataset::Dataset,
};
use mvagrid_training::{
    grid::GridPoint,
    trainer::{Classifier as _, Trainer, train},
};

use crate::{
    hierarchy::{CategoryHierarchy, HierarchyError},
    metrics::Metrics,
    ranking::{self, FeatureRank, FeatureStability, RankingAccumulator},
    report::ReportRow,
    table::EvaluationTable,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StudyError {
    #[display("invalid category hierarchy")]
    Hierarchy(HierarchyError),
}

#[derive(Debug, Clone)]
pub struct StudyOutcome {
    /// One row per grid point, in grid order.
    pub rows: Vec<ReportRow>,
    /// Ranking stability over the successfully trained grid points.
    pub feature_stability: Vec<FeatureStability>,
    /// Training categories left out because they cannot be balanced.
    pub excluded_categories: Vec<CategoryKey>,
}

/// Trains and evaluates every grid point over a frozen dataset.
///
/// Grid points run in parallel, at most one per available core. A grid point
/// that fails to train yields a failed row; the others are unaffected. A
/// category that cannot be balanced is left out of training for every grid
/// point. Hierarchy errors concern the whole dataset and abort the study
/// before any training.
pub fn run_study<T>(
    trainer: &T,
    dataset: &Dataset,
    points: &[GridPoint],
) -> Result<StudyOutcome, StudyError>
where
    T: Trainer,
{
    let hierarchy = CategoryHierarchy::from_dataset(dataset)?;
    let scales = balance::compute_scales(dataset);
    let set = TrainingSet::balanced(dataset, &scales);
    let threads = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    tracing::info!(
        points = points.len(),
        events = set.len(),
        threads,
        "starting study"
    );

    let mut results = Vec::with_capacity(points.len());
    let (hierarchy, set) = (&hierarchy, &set);
    for chunk in points.chunks(threads) {
        thread::scope(|s| {
            let handles = chunk
                .iter()
                .map(|point| {
                    let handle =
                        s.spawn(move || run_point(trainer, point, set, dataset, hierarchy));
                    (point, handle)
                })
                .collect::<Vec<_>>();
            for (point, handle) in handles {
                let result = handle.join().unwrap_or_else(|_| {
                    tracing::warn!(config = %point.name, "grid point panicked");
                    let reason = "panicked during training or evaluation";
                    (ReportRow::failed(point, &reason), None)
                });
                results.push(result);
            }
        });
    }

    let mut accumulator = RankingAccumulator::new();
    let rows = results
        .into_iter()
        .map(|(row, ranks)| {
            if let Some(ranks) = ranks {
                accumulator.add(&ranks);
            }
            row
        })
        .collect();
    Ok(StudyOutcome {
        rows,
        feature_stability: accumulator.summary(),
        excluded_categories: scales
            .excluded
            .into_iter()
            .map(|e| {
                let balance::BalanceError::DivisionByZero { key } = e;
                key
            })
            .collect(),
    })
}

fn run_point<T>(
    trainer: &T,
    point: &GridPoint,
    set: &TrainingSet<'_>,
    dataset: &Dataset,
    hierarchy: &CategoryHierarchy,
) -> (ReportRow, Option<Vec<FeatureRank>>)
where
    T: Trainer,
{
    let model = match train(trainer, point, set) {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!(config = %point.name, error = %e, "grid point failed");
            return (ReportRow::failed(point, &e), None);
        }
    };
    let table = EvaluationTable::evaluate(&model, dataset, hierarchy);
    let metrics = Metrics::compute(&table);
    let ranks = ranking::rank(&model.feature_importance());
    tracing::info!(
        config = %point.name,
        working_points = metrics.significance.len(),
        "grid point evaluated"
    );
    (ReportRow::assemble(point, &metrics, ranks.clone()), Some(ranks))
}

#[cfg(test)]
mod tests {
    use mvagrid_dataset::{
        assign::{BackgroundAssigner, WorkingPoint},
        category::{CategoryKey, Channel, SampleId, Spin},
        dataset::{DatasetBuilder, IncomingEvent},
        feature::{Feature, FeatureLayout},
        fold::Fold,
        random::DrawStream,
        split::FoldSplitter,
    };
    use mvagrid_training::{
        grid::{GridAxis, GridSpace, ParamValue},
        stumps::BoostedStumpTrainer,
    };
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};
    use rand_pcg::Pcg32;

    use crate::report::RowStatus;

    use super::*;

    fn dataset(signal_events: usize, background_events: usize) -> Dataset {
        builder(signal_events, background_events).build()
    }

    fn builder(signal_events: usize, background_events: usize) -> DatasetBuilder {
        let assigner = BackgroundAssigner::new(
            vec![WorkingPoint { mass: 300, spin: 0 }],
            DrawStream::sequential(1),
        )
        .unwrap();
        let mut splitter = FoldSplitter::new(4, 0, DrawStream::sequential(2)).unwrap();
        let mut builder = DatasetBuilder::new(FeatureLayout::new(None, false), assigner);
        let mut rng = Pcg32::seed_from_u64(3);
        let signal = Normal::new(1.5, 1.0).unwrap();
        let background = Normal::new(-1.5, 1.0).unwrap();
        let noise = Normal::new(0.0, 1.0).unwrap();

        let samples = std::iter::repeat_n((SampleId::Signal { mass: 300 }, signal), signal_events)
            .chain(std::iter::repeat_n(
                (SampleId::BackgroundAll, background),
                background_events,
            ));
        for (i, (sample, dist)) in samples.enumerate() {
            let features = [
                Feature::new("good", dist.sample(&mut rng)),
                Feature::new("noise", noise.sample(&mut rng)),
            ];
            builder
                .add_event(IncomingEvent {
                    event_key: i as u64,
                    fold: splitter.assign(i as u64),
                    features: &features,
                    sample,
                    spin: Some(0),
                    channel: "A",
                    weight: 1.0,
                    sample_weight: 1.0,
                })
                .unwrap();
        }
        builder
    }

    fn points() -> Vec<GridPoint> {
        GridSpace::new(vec![GridAxis::new(
            "NTrees",
            vec![ParamValue::Int(5), ParamValue::Int(20)],
        )])
        .unwrap()
        .expand()
    }

    #[test]
    fn test_end_to_end_two_rows() {
        let dataset = dataset(200, 2000);
        let outcome = run_study(&BoostedStumpTrainer, &dataset, &points()).unwrap();
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].config, "NTrees-5");
        assert_eq!(outcome.rows[1].config, "NTrees-20");

        let concrete = CategoryKey::stored("A", SampleId::Signal { mass: 300 }, Some(0));
        let inclusive = CategoryKey::new(Channel::Any, SampleId::AnyMass, Spin::Any);
        for row in &outcome.rows {
            assert!(row.is_trained(), "{:?}", row.status);
            for key in [&concrete, &inclusive] {
                let record = row.significance_of(key).unwrap();
                assert!(!record.significance.is_nan());
                assert!(record.significance > 0.0);
                assert!(!record.significance_error.is_nan());
            }
            assert_eq!(row.features.len(), 2);
            assert_eq!(row.features[0].name, "good");
        }
        assert_eq!(outcome.feature_stability.len(), 2);
    }

    #[test]
    fn test_failed_point_does_not_stop_siblings() {
        // Background only: every grid point lacks a second class
        let dataset = dataset(0, 100);
        let outcome = run_study(&BoostedStumpTrainer, &dataset, &points()).unwrap();
        assert_eq!(outcome.rows.len(), 2);
        for row in &outcome.rows {
            assert!(matches!(row.status, RowStatus::Failed { .. }));
        }
        assert!(outcome.feature_stability.is_empty());
    }

    #[test]
    fn test_invalid_hyperparameter_fails_only_its_row() {
        let dataset = dataset(100, 400);
        let points = GridSpace::new(vec![GridAxis::new(
            "NTrees",
            vec![ParamValue::Int(0), ParamValue::Int(10)],
        )])
        .unwrap()
        .expand();
        let outcome = run_study(&BoostedStumpTrainer, &dataset, &points).unwrap();
        assert!(!outcome.rows[0].is_trained());
        assert!(outcome.rows[1].is_trained());
        assert_eq!(
            outcome.rows[1].roc.len(),
            outcome.rows[1].significance.len()
        );
    }

    #[test]
    fn test_zero_weight_category_is_left_out_of_training() {
        let mut builder = builder(200, 2000);
        let features = [Feature::new("good", 1.0), Feature::new("noise", 0.0)];
        let empty = builder
            .add_event(IncomingEvent {
                event_key: 0,
                fold: Fold::Training,
                features: &features,
                sample: SampleId::Signal { mass: 500 },
                spin: Some(0),
                channel: "A",
                weight: 0.0,
                sample_weight: 1.0,
            })
            .unwrap();
        let dataset = builder.build();

        let outcome = run_study(&BoostedStumpTrainer, &dataset, &points()).unwrap();
        assert_eq!(outcome.excluded_categories, vec![empty]);
        assert!(outcome.rows.iter().all(ReportRow::is_trained));
    }
}
