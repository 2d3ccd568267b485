use std::collections::{BTreeMap, BTreeSet};

use mvagrid_dataset::{
    assign::WorkingPoint,
    sample::{MassRange, SampleEntry, signal_working_points},
};
use mvagrid_training::grid::{GridAxis, GridError, GridSpace};
use serde::{Deserialize, Serialize};

/// Study description: sample lists per mass range and MVA setups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    pub samples: BTreeMap<String, SampleList>,
    pub setups: BTreeMap<String, MvaSetup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleList {
    pub files: Vec<SampleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvaSetup {
    /// Enabled feature names. Every feature of the first event when absent.
    #[serde(default)]
    pub variables: Option<BTreeSet<String>>,
    #[serde(default)]
    pub use_mass_var: bool,
    pub mass_range: MassRange,
    #[serde(default = "default_sample_weight")]
    pub sample_weight: f64,
    /// Channels read from the event files. Every channel when empty.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub grid: Vec<GridAxis>,
    /// Background working points overriding the ones derived from signal.
    #[serde(default)]
    pub background_points: Option<Vec<WorkingPoint>>,
}

fn default_sample_weight() -> f64 {
    1.0
}

impl MvaSetup {
    #[must_use]
    pub fn accepts_channel(&self, channel: &str) -> bool {
        self.channels.is_empty() || self.channels.iter().any(|c| c == channel)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("no sample list for range '{range}'")]
    MissingSampleList { range: String },
    #[display("no MVA setup named '{name}'")]
    MissingSetup { name: String },
    #[display("setup '{name}' has no signal working point to assign background to")]
    NoSignalWorkingPoints { name: String },
}

/// Sample list and setup chosen for one run.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub name: &'a str,
    pub samples: &'a [SampleEntry],
    pub setup: &'a MvaSetup,
}

impl StudyConfig {
    /// Picks the sample list of `range` and the setup named
    /// `{range}{number_variables}`.
    pub fn select(&self, range: &str, number_variables: u32) -> Result<Selection<'_>, ConfigError> {
        let samples = self
            .samples
            .get(range)
            .ok_or_else(|| ConfigError::MissingSampleList {
                range: range.to_owned(),
            })?;
        let name = format!("{range}{number_variables}");
        let (name, setup) = self
            .setups
            .get_key_value(&name)
            .ok_or(ConfigError::MissingSetup { name })?;
        Ok(Selection {
            name,
            samples: &samples.files,
            setup,
        })
    }
}

impl Selection<'_> {
    /// Working points background events are spread over.
    pub fn working_points(&self) -> Result<Vec<WorkingPoint>, ConfigError> {
        let points = match &self.setup.background_points {
            Some(points) => points.clone(),
            None => signal_working_points(self.samples, self.setup.mass_range),
        };
        if points.is_empty() {
            return Err(ConfigError::NoSignalWorkingPoints {
                name: self.name.to_owned(),
            });
        }
        Ok(points)
    }

    pub fn grid(&self) -> Result<GridSpace, GridError> {
        GridSpace::new(self.setup.grid.clone())
    }

    /// Sample entries inside the setup's mass range.
    pub fn samples(&self) -> impl Iterator<Item = &SampleEntry> {
        self.samples
            .iter()
            .filter(|e| !e.id.is_signal_class() || self.setup.mass_range.accepts(e.id))
    }
}

#[cfg(test)]
mod tests {
    use mvagrid_dataset::category::SampleId;

    use super::*;

    const CONFIG: &str = r#"{
        "samples": {
            "low": {
                "files": [
                    { "file": "sig300.json", "id": { "type": "signal", "mass": 300 }, "spin": 0, "weight": 0.5 },
                    { "file": "sig900.json", "id": { "type": "signal", "mass": 900 }, "spin": 0, "weight": 0.5 },
                    { "file": "bkg.json", "id": { "type": "background_all" }, "weight": 2.0, "sample_weight": 3.0 }
                ]
            }
        },
        "setups": {
            "low2": {
                "variables": ["pt", "m_vis"],
                "mass_range": { "min": 250, "max": 400 },
                "grid": [ { "name": "NTrees", "values": [50, 100] }, { "name": "Shrinkage", "values": [0.1] } ]
            },
            "low3": {
                "mass_range": { "min": 1000, "max": 2000 }
            }
        }
    }"#;

    fn config() -> StudyConfig {
        serde_json::from_str(CONFIG).unwrap()
    }

    #[test]
    fn test_select_by_range_and_number_of_variables() {
        let config = config();
        let selection = config.select("low", 2).unwrap();
        assert_eq!(selection.name, "low2");
        assert_eq!(selection.samples.len(), 3);
        assert_eq!(selection.setup.sample_weight, 1.0);
        assert_eq!(selection.samples[2].sample_weight, Some(3.0));
        assert_eq!(selection.grid().unwrap().len(), 2);

        // The 900 GeV signal is outside the mass range
        let ids = selection.samples().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids, [SampleId::Signal { mass: 300 }, SampleId::BackgroundAll]);
        assert_eq!(
            selection.working_points().unwrap(),
            [WorkingPoint { mass: 300, spin: 0 }]
        );
    }

    #[test]
    fn test_missing_selectors() {
        let config = config();
        assert!(matches!(
            config.select("high", 2),
            Err(ConfigError::MissingSampleList { .. })
        ));
        assert!(matches!(
            config.select("low", 7),
            Err(ConfigError::MissingSetup { .. })
        ));
    }

    #[test]
    fn test_no_working_points_in_range() {
        let config = config();
        let selection = config.select("low", 3).unwrap();
        assert!(matches!(
            selection.working_points(),
            Err(ConfigError::NoSignalWorkingPoints { .. })
        ));
        assert_eq!(selection.grid().unwrap().len(), 1);
    }
}
