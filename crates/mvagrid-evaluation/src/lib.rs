//! Evaluation of trained classifiers over a category hierarchy.
//!
//! For each grid point, the trained model scores every stored event once. The
//! scores are filed under their concrete category and rolled up into the
//! declared aggregate parents, then turned into metrics and one report row.
//!
//! # Architecture
//!
//! ```text
//! Dataset (frozen)
//!     ↓ categories
//! CategoryHierarchy (concrete key → parents)
//!     ↓ drives
//! EvaluationTable (category → fold → weighted scores)
//!     ↓ read by
//! Metrics (ROC, KS, chi-square, significance)   Ranking (feature positions)
//!     ↓                                              ↓
//! ReportRow (one per grid point)  ←──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`hierarchy`]: parent-derivation table with class and duplicate checks
//! - [`table`]: scoring and roll-up into the evaluation table
//! - [`metrics`]: per-configuration metrics read from the table
//! - [`ranking`]: feature ranking and its stability across configurations
//! - [`report`]: flat, serializable report rows
//! - [`study`]: parallel driver running every grid point

pub mod hierarchy;
pub mod metrics;
pub mod ranking;
pub mod report;
pub mod study;
pub mod table;
