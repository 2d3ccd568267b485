//! Event bookkeeping for classifier studies.
//!
//! Events are read once, assigned to a train/test [`fold::Fold`] and stored
//! under a [`category::CategoryKey`] `{channel, sample, spin}`. Once all events
//! are in, the [`dataset::DatasetBuilder`] is frozen into a read-only
//! [`dataset::Dataset`] that every training and evaluation step shares.
//!
//! - [`category`]: sample ids, channels, spins and the composite category key
//! - [`fold`]: train/test partition and per-fold containers
//! - [`feature`]: feature-name discovery and per-event feature vectors
//! - [`dataset`]: the accumulator and the frozen dataset
//! - [`balance`]: per-category scale factors and the balanced training set
//! - [`assign`]: background pseudo-category assignment
//! - [`split`]: random fold assignment and blind/unblind selection
//! - [`random`]: seeded draw streams shared by the ingestion stages
//! - [`sample`]: sample list entries and signal working points

use crate::category::SampleId;

pub mod assign;
pub mod balance;
pub mod category;
pub mod dataset;
pub mod feature;
pub mod fold;
pub mod random;
pub mod sample;
pub mod split;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("invalid event size: expected {expected} features, found {found}")]
    InvalidEventSize { expected: usize, found: usize },
    #[display("feature '{name}' was not seen in the first event")]
    UnexpectedFeature { name: String },
    #[display("feature '{name}' given more than once")]
    DuplicateFeature { name: String },
    #[display("mass variables are enabled but no mass metadata was given")]
    MissingMassFeatures,
    #[display("events cannot be stored under aggregate sample {sample}")]
    AggregateSample { sample: SampleId },
}
