use std::collections::BTreeMap;

use crate::{
    DatasetError,
    assign::BackgroundAssigner,
    category::{CategoryKey, SampleClass, SampleId},
    feature::{Feature, FeatureLayout, MassFeatures},
    fold::{Fold, FoldPair},
};

/// One accepted event: its laid-out features and its original weight.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub features: Vec<f64>,
    pub weight: f64,
}

/// Events of one `(fold, category)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    /// Target normalization of the category, last write wins.
    pub sample_weight: f64,
    pub events: Vec<StoredEvent>,
}

impl Bucket {
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.events.iter().map(|e| e.weight).sum()
    }
}

pub type Buckets = BTreeMap<CategoryKey, Bucket>;

/// An event offered to the [`DatasetBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct IncomingEvent<'a> {
    /// Stable key of the event, selects its per-event random stream.
    pub event_key: u64,
    pub fold: Fold,
    pub features: &'a [Feature],
    /// Declared sample. Background events are reassigned to a drawn pseudo
    /// mass, whatever background id they declare.
    pub sample: SampleId,
    pub spin: Option<i32>,
    pub channel: &'a str,
    pub weight: f64,
    pub sample_weight: f64,
}

/// Frozen, read-only event store: `fold -> category -> bucket`.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    folds: FoldPair<Buckets>,
}

impl Dataset {
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn fold(&self, fold: Fold) -> &Buckets {
        &self.folds[fold]
    }

    #[must_use]
    pub fn bucket(&self, fold: Fold, key: &CategoryKey) -> Option<&Bucket> {
        self.folds[fold].get(key)
    }

    /// Iterates every bucket, training fold first, keys in ascending order.
    pub fn buckets(&self) -> impl Iterator<Item = (Fold, &CategoryKey, &Bucket)> {
        self.folds
            .iter()
            .flat_map(|(fold, buckets)| buckets.iter().map(move |(k, b)| (fold, k, b)))
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.buckets().map(|(_, _, b)| b.events.len()).sum()
    }

    #[must_use]
    pub fn num_events_of(&self, fold: Fold) -> usize {
        self.folds[fold].values().map(|b| b.events.len()).sum()
    }
}

/// Accumulates events into per-fold, per-category buckets.
///
/// Background events are spread over the signal working points by the owned
/// [`BackgroundAssigner`]; the assigner is consumed once per background event,
/// in ingestion order, and given the event's key.
#[derive(Debug)]
pub struct DatasetBuilder {
    layout: FeatureLayout,
    assigner: BackgroundAssigner,
    channels: Vec<String>,
    folds: FoldPair<Buckets>,
    num_events: u64,
}

impl DatasetBuilder {
    #[must_use]
    pub fn new(layout: FeatureLayout, assigner: BackgroundAssigner) -> Self {
        Self {
            layout,
            assigner,
            channels: vec![],
            folds: FoldPair::default(),
            num_events: 0,
        }
    }

    /// Pre-registers channel names so the `channel` feature uses their order.
    #[must_use]
    pub fn with_channels<I>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for channel in channels {
            self.channel_index(&channel);
        }
        self
    }

    #[expect(clippy::cast_precision_loss)]
    fn channel_index(&mut self, channel: &str) -> f64 {
        if let Some(pos) = self.channels.iter().position(|c| c == channel) {
            return pos as f64;
        }
        self.channels.push(channel.to_owned());
        (self.channels.len() - 1) as f64
    }

    /// Adds one event and returns the category it was stored under.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvagrid_dataset::{
    ///     assign::{BackgroundAssigner, WorkingPoint},
    ///     category::SampleId,
    ///     dataset::{DatasetBuilder, IncomingEvent},
    ///     feature::{Feature, FeatureLayout},
    ///     fold::Fold,
    ///     random::DrawStream,
    /// };
    ///
    /// let assigner = BackgroundAssigner::new(
    ///     vec![WorkingPoint { mass: 300, spin: 0 }],
    ///     DrawStream::sequential(1),
    /// )
    /// .unwrap();
    /// let mut builder = DatasetBuilder::new(FeatureLayout::new(None, false), assigner);
    /// let features = [Feature::new("pt", 40.0)];
    /// let key = builder
    ///     .add_event(IncomingEvent {
    ///         event_key: 0,
    ///         fold: Fold::Training,
    ///         features: &features,
    ///         sample: SampleId::BackgroundAll,
    ///         spin: None,
    ///         channel: "mu_tau",
    ///         weight: 0.5,
    ///         sample_weight: 1.0,
    ///     })
    ///     .unwrap();
    /// assert_eq!(key.sample, SampleId::Background { pseudo_mass: 300 });
    ///
    /// let dataset = builder.build();
    /// assert_eq!(dataset.num_events(), 1);
    /// ```
    pub fn add_event(&mut self, event: IncomingEvent<'_>) -> Result<CategoryKey, DatasetError> {
        let (sample, spin) = match event.sample.class() {
            SampleClass::Background => {
                let (sample, spin) = self.assigner.assign(event.event_key);
                (sample, Some(spin))
            }
            SampleClass::Signal => (event.sample, event.spin),
        };
        let key = CategoryKey::stored(event.channel, sample, spin);
        if !key.is_concrete() {
            return Err(DatasetError::AggregateSample { sample });
        }

        let mass = if self.layout.use_mass_var() {
            Some(MassFeatures {
                mass: f64::from(sample.mass().unwrap_or_default()),
                channel: self.channel_index(event.channel),
                spin: f64::from(spin.unwrap_or_default()),
            })
        } else {
            None
        };
        let features = self.layout.extract(event.features, mass)?;

        let buckets = &mut self.folds[event.fold];
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(fold = %event.fold, category = %key, "new category");
            Bucket::default()
        });
        bucket.sample_weight = event.sample_weight;
        bucket.events.push(StoredEvent {
            features,
            weight: event.weight,
        });
        self.num_events += 1;
        Ok(key)
    }

    #[must_use]
    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    /// Freezes the accumulated events.
    #[must_use]
    pub fn build(self) -> Dataset {
        tracing::info!(
            training = self.folds.training.len(),
            testing = self.folds.testing.len(),
            events = self.num_events,
            "dataset frozen"
        );
        Dataset {
            feature_names: self.layout.names().to_vec(),
            folds: self.folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assign::WorkingPoint,
        category::{Channel, Spin},
        random::{self, DrawStream},
        split::FoldSplitter,
    };

    use super::*;

    fn builder(seed: u64, use_mass_var: bool) -> DatasetBuilder {
        let points = vec![
            WorkingPoint { mass: 300, spin: 0 },
            WorkingPoint { mass: 400, spin: 2 },
        ];
        let assigner = BackgroundAssigner::new(points, DrawStream::sequential(seed)).unwrap();
        DatasetBuilder::new(FeatureLayout::new(None, use_mass_var), assigner)
    }

    fn event<'a>(features: &'a [Feature], sample: SampleId, fold: Fold) -> IncomingEvent<'a> {
        IncomingEvent {
            event_key: 0,
            fold,
            features,
            sample,
            spin: Some(0),
            channel: "A",
            weight: 1.0,
            sample_weight: 10.0,
        }
    }

    #[test]
    fn test_background_spin_is_normalized() {
        let mut b = builder(1, false);
        let features = [Feature::new("x", 1.0)];
        for _ in 0..20 {
            let key = b
                .add_event(event(&features, SampleId::BackgroundAll, Fold::Training))
                .unwrap();
            assert_eq!(key.spin, Spin::None);
            assert!(matches!(key.sample, SampleId::Background { .. }));
        }
    }

    #[test]
    fn test_draw_sequence_is_reproducible() {
        let features = [Feature::new("x", 1.0)];
        let run = |seed| {
            let mut b = builder(seed, false);
            (0..200)
                .map(|_| {
                    b.add_event(event(&features, SampleId::BackgroundAll, Fold::Training))
                        .unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(17), run(17));
    }

    #[test]
    fn test_buckets_per_fold_and_key() {
        let mut b = builder(1, false);
        let features = [Feature::new("x", 1.0)];
        let signal = SampleId::Signal { mass: 300 };
        b.add_event(event(&features, signal, Fold::Training)).unwrap();
        b.add_event(event(&features, signal, Fold::Training)).unwrap();
        b.add_event(event(&features, signal, Fold::Testing)).unwrap();
        let dataset = b.build();

        let key = CategoryKey::new(Channel::named("A"), signal, Spin::Value(0));
        assert_eq!(dataset.bucket(Fold::Training, &key).unwrap().events.len(), 2);
        assert_eq!(dataset.bucket(Fold::Testing, &key).unwrap().events.len(), 1);
        assert_eq!(dataset.num_events(), 3);
        assert_eq!(dataset.feature_names(), ["x"]);
    }

    #[test]
    fn test_sample_weight_last_write_wins() {
        let mut b = builder(1, false);
        let features = [Feature::new("x", 1.0)];
        let signal = SampleId::SignalNonResonant;
        let mut e = event(&features, signal, Fold::Training);
        b.add_event(e).unwrap();
        e.sample_weight = 3.0;
        let key = b.add_event(e).unwrap();
        let dataset = b.build();
        assert_eq!(dataset.bucket(Fold::Training, &key).unwrap().sample_weight, 3.0);
    }

    #[test]
    fn test_aggregate_signal_is_rejected() {
        let mut b = builder(1, false);
        let features = [Feature::new("x", 1.0)];
        let err = b
            .add_event(event(&features, SampleId::AnyMass, Fold::Training))
            .unwrap_err();
        assert!(matches!(err, DatasetError::AggregateSample { .. }));
        assert_eq!(b.num_events(), 0);
    }

    #[test]
    fn test_mass_features_follow_drawn_point() {
        let mut b = builder(4, true).with_channels(["B".to_owned(), "A".to_owned()]);
        let features = [Feature::new("x", 1.0)];
        let key = b
            .add_event(event(&features, SampleId::BackgroundAll, Fold::Testing))
            .unwrap();
        let dataset = b.build();
        let stored = &dataset.bucket(Fold::Testing, &key).unwrap().events[0];
        let SampleId::Background { pseudo_mass } = key.sample else {
            panic!("background expected");
        };
        assert_eq!(stored.features[1], f64::from(pseudo_mass));
        assert_eq!(stored.features[2], 1.0);
        let expected_spin = if pseudo_mass == 300 { 0.0 } else { 2.0 };
        assert_eq!(stored.features[3], expected_spin);
    }

    #[test]
    fn test_per_event_streams_ignore_file_order() {
        let features = [Feature::new("x", 1.0)];
        let signal = (0..20).map(|i| ("signal.json", i, SampleId::Signal { mass: 300 }));
        let background = (0..20).map(|i| ("background.json", i, SampleId::BackgroundAll));
        let run = |events: Vec<(&'static str, u64, SampleId)>| {
            let points = vec![
                WorkingPoint { mass: 300, spin: 0 },
                WorkingPoint { mass: 400, spin: 2 },
            ];
            let assigner = BackgroundAssigner::new(points, DrawStream::per_event(7)).unwrap();
            let mut splitter = FoldSplitter::new(4, 0, DrawStream::per_event(8)).unwrap();
            let mut b = DatasetBuilder::new(FeatureLayout::new(None, false), assigner);
            events
                .into_iter()
                .map(|(file, id, sample)| {
                    let event_key = random::event_key(file, id);
                    let fold = splitter.assign(event_key);
                    let key = b
                        .add_event(IncomingEvent {
                            event_key,
                            fold,
                            ..event(&features, sample, fold)
                        })
                        .unwrap();
                    ((file, id), (fold, key))
                })
                .collect::<BTreeMap<_, _>>()
        };

        let signal_first = run(signal.clone().chain(background.clone()).collect());
        let background_first = run(background.chain(signal).collect());
        assert_eq!(signal_first.len(), 40);
        assert_eq!(signal_first, background_first);
    }
}
