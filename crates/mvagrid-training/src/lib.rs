//! Hyperparameter grids and classifier training.
//!
//! The classifier itself is opaque to the rest of the workspace: anything that
//! implements [`trainer::Trainer`] can be plugged into a study. This crate
//! provides
//!
//! - [`grid`]: expansion of a declarative hyperparameter space into named
//!   [`grid::GridPoint`]s
//! - [`trainer`]: the [`trainer::Trainer`] and [`trainer::Classifier`] traits and
//!   the guarded [`trainer::train`] entry point
//! - [`stumps`]: a boosted decision-stump classifier used as the default trainer
//!
//! # Example
//!
//! ```
//! use mvagrid_dataset::{balance::{TrainingEvent, TrainingSet}, category::SampleClass};
//! use mvagrid_training::{
//!     grid::{GridAxis, GridSpace, ParamValue},
//!     stumps::BoostedStumpTrainer,
//!     trainer::{Classifier, train},
//! };
//!
//! let names = vec!["x".to_owned()];
//! let values = (0..40).map(|i| [f64::from(i)]).collect::<Vec<_>>();
//! let events = values
//!     .iter()
//!     .enumerate()
//!     .map(|(i, v)| TrainingEvent {
//!         features: v,
//!         class: if i >= 20 { SampleClass::Signal } else { SampleClass::Background },
//!         weight: 1.0,
//!     })
//!     .collect();
//! let set = TrainingSet { feature_names: &names, events };
//!
//! let space = GridSpace::new(vec![GridAxis::new("NTrees", vec![ParamValue::Int(10)])]).unwrap();
//! for point in space.expand() {
//!     let model = train(&BoostedStumpTrainer, &point, &set).unwrap();
//!     assert!(model.score(&[35.0]) > model.score(&[5.0]));
//! }
//! ```

pub mod grid;
pub mod stumps;
pub mod trainer;
