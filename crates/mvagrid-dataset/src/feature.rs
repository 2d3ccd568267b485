//! Feature naming and per-event feature vectors.
//!
//! The list of feature names is discovered from the first accepted event and is
//! then fixed for the lifetime of the run: every later event must provide the
//! same set of enabled features, and its values are laid out in the order of the
//! first occurrence.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Metadata-derived features appended when the mass variables are enabled.
pub const MASS_FEATURES: [&str; 3] = ["mass", "channel", "spin"];

/// A named feature value as read from an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: f64,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Values of the metadata-derived features of one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassFeatures {
    pub mass: f64,
    pub channel: f64,
    pub spin: f64,
}

#[derive(Debug, Clone)]
pub struct FeatureLayout {
    enabled: Option<BTreeSet<String>>,
    use_mass_var: bool,
    names: Option<Vec<String>>,
}

impl FeatureLayout {
    /// Creates a layout keeping only the `enabled` features, or every feature
    /// when `enabled` is `None`.
    #[must_use]
    pub fn new(enabled: Option<BTreeSet<String>>, use_mass_var: bool) -> Self {
        Self {
            enabled,
            use_mass_var,
            names: None,
        }
    }

    #[must_use]
    pub fn use_mass_var(&self) -> bool {
        self.use_mass_var
    }

    /// The fixed feature names, or an empty slice before the first event.
    #[must_use]
    pub fn names(&self) -> &[String] {
        self.names.as_deref().unwrap_or_default()
    }

    fn selects(&self, name: &str) -> bool {
        if MASS_FEATURES.contains(&name) {
            return false;
        }
        self.enabled
            .as_ref()
            .is_none_or(|enabled| enabled.contains(name))
    }

    /// Lays out the enabled features of one event.
    ///
    /// The first call fixes the feature names. `mass` holds the values of the
    /// [`MASS_FEATURES`] and is ignored unless the mass variables are enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvagrid_dataset::feature::{Feature, FeatureLayout};
    ///
    /// let mut layout = FeatureLayout::new(None, false);
    /// let first = layout
    ///     .extract(&[Feature::new("pt", 30.0), Feature::new("eta", 1.2)], None)
    ///     .unwrap();
    /// assert_eq!(first, vec![30.0, 1.2]);
    ///
    /// // Later events may list the same features in any order
    /// let second = layout
    ///     .extract(&[Feature::new("eta", -0.4), Feature::new("pt", 45.0)], None)
    ///     .unwrap();
    /// assert_eq!(second, vec![45.0, -0.4]);
    /// ```
    pub fn extract(
        &mut self,
        features: &[Feature],
        mass: Option<MassFeatures>,
    ) -> Result<Vec<f64>, DatasetError> {
        let selected = features
            .iter()
            .filter(|f| self.selects(&f.name))
            .collect::<Vec<_>>();
        let mass_values = self
            .use_mass_var
            .then(|| {
                mass.map(|m| [m.mass, m.channel, m.spin])
                    .ok_or(DatasetError::MissingMassFeatures)
            })
            .transpose()?;

        let Some(names) = &self.names else {
            let mut names = selected.iter().map(|f| f.name.clone()).collect::<Vec<_>>();
            let mut values = selected.iter().map(|f| f.value).collect::<Vec<_>>();
            if let Some(mass_values) = mass_values {
                names.extend(MASS_FEATURES.iter().map(|&n| n.to_owned()));
                values.extend(mass_values);
            }
            let unique = names.iter().collect::<BTreeSet<_>>();
            if unique.len() != names.len() {
                return Err(DatasetError::DuplicateFeature {
                    name: first_duplicate(&names),
                });
            }
            tracing::debug!(features = ?names, "feature layout fixed");
            self.names = Some(names);
            return Ok(values);
        };

        let found = selected.len() + mass_values.map_or(0, |m| m.len());
        if found != names.len() {
            return Err(DatasetError::InvalidEventSize {
                expected: names.len(),
                found,
            });
        }

        let mut slots = vec![None; names.len()];
        let named = selected.iter().map(|f| (f.name.as_str(), f.value));
        let derived = mass_values
            .into_iter()
            .flat_map(|m| MASS_FEATURES.into_iter().zip(m));
        for (name, value) in named.chain(derived) {
            let pos = names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| DatasetError::UnexpectedFeature {
                    name: name.to_owned(),
                })?;
            if slots[pos].replace(value).is_some() {
                return Err(DatasetError::DuplicateFeature {
                    name: name.to_owned(),
                });
            }
        }
        // Equal counts and no duplicates leave no slot empty
        Ok(slots.into_iter().flatten().collect())
    }
}

fn first_duplicate(names: &[String]) -> String {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .find(|n| !seen.insert(n.as_str()))
        .cloned()
        .unwrap_or_default()
}
