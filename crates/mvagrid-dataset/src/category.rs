//! Category identities used as dataset and evaluation map keys.
//!
//! A [`CategoryKey`] combines three axes, each with its own wildcard:
//!
//! | Axis      | Concrete values                         | Wildcard / aggregate                   |
//! |-----------|-----------------------------------------|----------------------------------------|
//! | `channel` | [`Channel::Named`]                      | [`Channel::Any`] (`ANY_CHANNEL`)       |
//! | `sample`  | `Signal`, `SignalNonResonant`, `Background` | [`SampleId::AnyMass`] (signal), [`SampleId::BackgroundAll`] (background) |
//! | `spin`    | [`Spin::Value`]                         | [`Spin::Any`] (`SPIN_ANY`)             |
//!
//! [`Spin::None`] is not a wildcard: it marks categories that have no spin
//! hypothesis at all. Every background key carries it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physics sample class of an event or category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleClass {
    Signal,
    Background,
}

/// Identity of a physics sample.
///
/// The derived ordering (variant first, then mass) gives deterministic map
/// iteration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SampleId {
    /// Resonant signal at the given mass.
    #[display("Signal_M{mass}")]
    Signal { mass: u32 },
    /// Non-resonant signal.
    #[display("NonRes")]
    SignalNonResonant,
    /// Background assigned to the signal working point of the given mass.
    #[display("Bkg_M{pseudo_mass}")]
    Background { pseudo_mass: u32 },
    /// Signal aggregate over every mass point and the non-resonant sample.
    #[display("AnyMass")]
    AnyMass,
    /// Background aggregate over every pseudo mass.
    #[display("Bkg_All")]
    BackgroundAll,
}

impl SampleId {
    #[must_use]
    pub const fn class(self) -> SampleClass {
        match self {
            Self::Signal { .. } | Self::SignalNonResonant | Self::AnyMass => SampleClass::Signal,
            Self::Background { .. } | Self::BackgroundAll => SampleClass::Background,
        }
    }

    #[must_use]
    pub const fn is_signal_class(self) -> bool {
        matches!(self.class(), SampleClass::Signal)
    }

    #[must_use]
    pub const fn is_background_class(self) -> bool {
        matches!(self.class(), SampleClass::Background)
    }

    /// Returns `true` for [`SampleId::AnyMass`] and [`SampleId::BackgroundAll`].
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::AnyMass | Self::BackgroundAll)
    }

    /// Resonance mass carried by the sample, `0` for non-resonant signal.
    #[must_use]
    pub const fn mass(self) -> Option<u32> {
        match self {
            Self::Signal { mass } | Self::Background { pseudo_mass: mass } => Some(mass),
            Self::SignalNonResonant => Some(0),
            Self::AnyMass | Self::BackgroundAll => None,
        }
    }
}

/// Analysis channel of a category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    Named(String),
    /// Aggregate over every channel.
    Any,
}

impl Channel {
    pub const ANY_NAME: &'static str = "ANY_CHANNEL";

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Any => f.write_str(Self::ANY_NAME),
        }
    }
}

impl From<String> for Channel {
    fn from(value: String) -> Self {
        if value == Self::ANY_NAME {
            Self::Any
        } else {
            Self::Named(value)
        }
    }
}

impl From<Channel> for String {
    fn from(value: Channel) -> Self {
        value.to_string()
    }
}

/// Spin hypothesis of a category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Spin {
    #[display("{_0}")]
    Value(i32),
    /// Aggregate over every spin hypothesis.
    #[display("SPIN_ANY")]
    Any,
    /// No spin hypothesis (background).
    #[display("NO_SPIN")]
    None,
}

impl Spin {
    #[must_use]
    pub const fn value(self) -> Option<i32> {
        match self {
            Self::Value(v) => Some(v),
            Self::Any | Self::None => None,
        }
    }
}

/// Composite category identity `{channel, sample, spin}`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{channel}/{sample}/{spin}")]
pub struct CategoryKey {
    pub channel: Channel,
    pub sample: SampleId,
    pub spin: Spin,
}

impl CategoryKey {
    #[must_use]
    pub const fn new(channel: Channel, sample: SampleId, spin: Spin) -> Self {
        Self {
            channel,
            sample,
            spin,
        }
    }

    /// Creates the key under which an event is stored.
    ///
    /// Background keys always carry [`Spin::None`], whatever spin is given.
    /// A signal sample without a declared spin is stored as spin `0`, the
    /// spin its working point is registered under.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvagrid_dataset::category::{CategoryKey, SampleId, Spin};
    ///
    /// let key = CategoryKey::stored("mu_tau", SampleId::Background { pseudo_mass: 300 }, Some(2));
    /// assert_eq!(key.spin, Spin::None);
    /// assert_eq!(key.to_string(), "mu_tau/Bkg_M300/NO_SPIN");
    /// ```
    #[must_use]
    pub fn stored(channel: &str, sample: SampleId, spin: Option<i32>) -> Self {
        let spin = match sample.class() {
            SampleClass::Signal => Spin::Value(spin.unwrap_or_default()),
            SampleClass::Background => Spin::None,
        };
        Self::new(Channel::named(channel), sample, spin)
    }

    #[must_use]
    pub const fn class(&self) -> SampleClass {
        self.sample.class()
    }

    /// Returns `true` if no axis holds a wildcard or aggregate value.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.channel.is_any() && !self.sample.is_aggregate() && self.spin != Spin::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_class_is_pure_function_of_tag() {
        assert_eq!(SampleId::Signal { mass: 300 }.class(), SampleClass::Signal);
        assert_eq!(SampleId::SignalNonResonant.class(), SampleClass::Signal);
        assert_eq!(SampleId::AnyMass.class(), SampleClass::Signal);
        assert_eq!(
            SampleId::Background { pseudo_mass: 300 }.class(),
            SampleClass::Background
        );
        assert_eq!(SampleId::BackgroundAll.class(), SampleClass::Background);
    }

    #[test]
    fn test_sample_ordering_by_tag_then_mass() {
        let mut ids = vec![
            SampleId::BackgroundAll,
            SampleId::Signal { mass: 400 },
            SampleId::Background { pseudo_mass: 260 },
            SampleId::Signal { mass: 260 },
            SampleId::AnyMass,
            SampleId::SignalNonResonant,
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                SampleId::Signal { mass: 260 },
                SampleId::Signal { mass: 400 },
                SampleId::SignalNonResonant,
                SampleId::Background { pseudo_mass: 260 },
                SampleId::AnyMass,
                SampleId::BackgroundAll,
            ]
        );
    }

    #[test]
    fn test_stored_key_keeps_signal_spin() {
        let key = CategoryKey::stored("e_tau", SampleId::Signal { mass: 300 }, Some(2));
        assert_eq!(key.spin, Spin::Value(2));
        assert!(key.is_concrete());
    }

    #[test]
    fn test_spinless_signal_matches_its_working_point() {
        let entry = crate::sample::SampleEntry {
            file: "signal_M300.json".into(),
            id: SampleId::Signal { mass: 300 },
            spin: None,
            weight: 1.0,
            sample_weight: None,
        };
        let range = crate::sample::MassRange { min: 250, max: 400 };
        let points = crate::sample::signal_working_points(&[entry.clone()], range);
        let [point] = points.as_slice() else {
            panic!("one working point expected");
        };
        let key = CategoryKey::stored("e_tau", entry.id, entry.spin);
        assert_eq!(key.spin, Spin::Value(point.spin));
    }

    #[test]
    fn test_aggregate_keys_are_not_concrete() {
        let key = CategoryKey::new(Channel::Any, SampleId::Signal { mass: 300 }, Spin::Value(0));
        assert!(!key.is_concrete());
        let key = CategoryKey::new(Channel::named("A"), SampleId::AnyMass, Spin::Value(0));
        assert!(!key.is_concrete());
        let key = CategoryKey::new(Channel::named("A"), SampleId::SignalNonResonant, Spin::Any);
        assert!(!key.is_concrete());
    }

    #[test]
    fn test_serde_shapes() {
        let key = CategoryKey::new(Channel::Any, SampleId::Signal { mass: 300 }, Spin::Value(0));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(
            json,
            r#"{"channel":"ANY_CHANNEL","sample":{"type":"signal","mass":300},"spin":{"value":0}}"#
        );
        let back: CategoryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
