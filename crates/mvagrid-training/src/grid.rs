//! Exhaustive hyperparameter grid expansion.
//!
//! A [`GridSpace`] is an ordered list of axes, each holding an ordered list of
//! legal values. [`GridSpace::expand`] enumerates the full cartesian product in
//! odometer order: the last declared axis varies fastest. Each resulting
//! [`GridPoint`] gets a name built from its coordinates,
//!
//! ```text
//! <axis>-<label>_<axis>-<label>_...
//! ```
//!
//! where `label` is the value written with `.` replaced by `p` and `-` by `m`
//! (`0.5` → `0p5`, `-1` → `m1`). The name depends only on the declaration, so
//! expanding the same space twice yields identical names in identical order.
//!
//! # Examples
//!
//! ```
//! use mvagrid_training::grid::{GridAxis, GridSpace, ParamValue};
//!
//! let space = GridSpace::new(vec![
//!     GridAxis::new("NTrees", vec![ParamValue::Int(100), ParamValue::Int(200)]),
//!     GridAxis::new("Shrinkage", vec![ParamValue::Float(0.1), ParamValue::Float(0.5)]),
//! ])
//! .unwrap();
//!
//! let names = space.expand().into_iter().map(|p| p.name).collect::<Vec<_>>();
//! assert_eq!(
//!     names,
//!     [
//!         "NTrees-100_Shrinkage-0p1",
//!         "NTrees-100_Shrinkage-0p5",
//!         "NTrees-200_Shrinkage-0p1",
//!         "NTrees-200_Shrinkage-0p5",
//!     ]
//! );
//! ```

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Name of the single point of an empty grid.
pub const DEFAULT_POINT_NAME: &str = "default";

/// A legal hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric value, `None` for text.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Value rendered for use in a grid point name.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string().replace('.', "p").replace('-', "m")
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl GridAxis {
    pub fn new(name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GridError {
    #[display("grid axis '{axis}' has no values")]
    EmptyAxis { axis: String },
    #[display("grid axis '{axis}' declared more than once")]
    DuplicateAxis { axis: String },
    #[display("grid axis '{axis}' has two values labelled '{label}'")]
    DuplicateValue { axis: String, label: String },
}

/// Validated hyperparameter search space.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpace {
    axes: Vec<GridAxis>,
}

impl GridSpace {
    pub fn new(axes: Vec<GridAxis>) -> Result<Self, GridError> {
        let mut axis_names = BTreeSet::new();
        for axis in &axes {
            if axis.values.is_empty() {
                return Err(GridError::EmptyAxis {
                    axis: axis.name.clone(),
                });
            }
            if !axis_names.insert(axis.name.as_str()) {
                return Err(GridError::DuplicateAxis {
                    axis: axis.name.clone(),
                });
            }
            let mut labels = BTreeSet::new();
            for value in &axis.values {
                let label = value.label();
                if !labels.insert(label.clone()) {
                    return Err(GridError::DuplicateValue {
                        axis: axis.name.clone(),
                        label,
                    });
                }
            }
        }
        Ok(Self { axes })
    }

    #[must_use]
    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerates every grid point, last axis fastest.
    #[must_use]
    pub fn expand(&self) -> Vec<GridPoint> {
        let mut positions = vec![0; self.axes.len()];
        let mut points = Vec::with_capacity(self.len());
        loop {
            let coordinates = self
                .axes
                .iter()
                .zip(&positions)
                .map(|(axis, &position)| Coordinate {
                    axis: axis.name.clone(),
                    position,
                    value: axis.values[position].clone(),
                })
                .collect();
            points.push(GridPoint::from_coordinates(coordinates));

            // Advance the odometer from the last axis
            let mut carry = true;
            for (pos, axis) in positions.iter_mut().zip(&self.axes).rev() {
                *pos += 1;
                if *pos < axis.values.len() {
                    carry = false;
                    break;
                }
                *pos = 0;
            }
            if carry {
                break;
            }
        }
        points
    }
}

/// Position of a grid point along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub axis: String,
    /// Index of the value in the axis declaration.
    pub position: usize,
    pub value: ParamValue,
}

/// One concrete hyperparameter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub name: String,
    pub coordinates: Vec<Coordinate>,
}

impl GridPoint {
    fn from_coordinates(coordinates: Vec<Coordinate>) -> Self {
        let name = if coordinates.is_empty() {
            DEFAULT_POINT_NAME.to_owned()
        } else {
            coordinates
                .iter()
                .map(|c| format!("{}-{}", c.axis, c.value.label()))
                .collect::<Vec<_>>()
                .join("_")
        };
        Self { name, coordinates }
    }

    /// Returns the point with `_{suffix}` appended to its name.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl fmt::Display) -> Self {
        self.name = format!("{}_{suffix}", self.name);
        self
    }

    #[must_use]
    pub fn get(&self, axis: &str) -> Option<&ParamValue> {
        self.coordinates
            .iter()
            .find(|c| c.axis == axis)
            .map(|c| &c.value)
    }

    /// Trainer configuration payload, `axis=value` pairs joined by `:`.
    ///
    /// ```
    /// use mvagrid_training::grid::{GridAxis, GridSpace, ParamValue};
    ///
    /// let space = GridSpace::new(vec![
    ///     GridAxis::new("NTrees", vec![ParamValue::Int(100)]),
    ///     GridAxis::new("Shrinkage", vec![ParamValue::Float(0.5)]),
    /// ])
    /// .unwrap();
    /// assert_eq!(space.expand()[0].config_string(), "NTrees=100:Shrinkage=0.5");
    /// ```
    #[must_use]
    pub fn config_string(&self) -> String {
        self.coordinates
            .iter()
            .map(|c| format!("{}={}", c.axis, c.value))
            .collect::<Vec<_>>()
            .join(":")
    }
}
