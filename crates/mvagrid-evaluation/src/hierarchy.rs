//! Parent-derivation table of the category hierarchy.
//!
//! Every concrete category contributes its scores to a fixed, declared list of
//! aggregate parents. Parents are only ever derived from concrete keys, never
//! from other parents, so no score is counted twice in any aggregate.
//!
//! Signal `(ch, S, s)` with `S` a resonant mass or the non-resonant sample:
//!
//! ```text
//! (ANY, S,       s)     (ANY, S,       SPIN_ANY)   (ch, S,       SPIN_ANY)
//! (ANY, AnyMass, s)     (ANY, AnyMass, SPIN_ANY)   (ch, AnyMass, SPIN_ANY)
//! (ch,  AnyMass, s)
//! ```
//!
//! Background `(ch, Bkg_M, NO_SPIN)`; background has no spin axis, so it only
//! collapses channel and mass:
//!
//! ```text
//! (ANY, Bkg_M,   NO_SPIN)   (ch, Bkg_All, NO_SPIN)   (ANY, Bkg_All, NO_SPIN)
//! ```
//!
//! Each table entry is validated on insertion: the child must be concrete, no
//! parent may equal the child or another parent, and no parent may belong to
//! the other sample class.

use std::collections::{BTreeMap, BTreeSet};

use mvagrid_dataset::{
    category::{CategoryKey, Channel, SampleClass, SampleId, Spin},
    dataset::Dataset,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum HierarchyError {
    #[display("{child} is not a concrete category")]
    NotConcrete { child: CategoryKey },
    #[display("{child} lists itself as a parent")]
    ParentIsChild { child: CategoryKey },
    #[display("{child} lists parent {parent} more than once")]
    DuplicateParent {
        child: CategoryKey,
        parent: CategoryKey,
    },
    #[display("{child} cannot roll up into {parent} of the other sample class")]
    ClassCrossing {
        child: CategoryKey,
        parent: CategoryKey,
    },
}

/// Declared aggregate parents of a concrete category.
#[must_use]
pub fn derive_parents(key: &CategoryKey) -> Vec<CategoryKey> {
    let CategoryKey {
        channel,
        sample,
        spin,
    } = key;
    let key = |channel: &Channel, sample: SampleId, spin: Spin| {
        CategoryKey::new(channel.clone(), sample, spin)
    };
    let any = Channel::Any;
    match sample.class() {
        SampleClass::Signal => vec![
            key(&any, *sample, *spin),
            key(&any, *sample, Spin::Any),
            key(channel, *sample, Spin::Any),
            key(&any, SampleId::AnyMass, Spin::Any),
            key(channel, SampleId::AnyMass, Spin::Any),
            key(&any, SampleId::AnyMass, *spin),
            key(channel, SampleId::AnyMass, *spin),
        ],
        SampleClass::Background => vec![
            key(&any, *sample, Spin::None),
            key(channel, SampleId::BackgroundAll, Spin::None),
            key(&any, SampleId::BackgroundAll, Spin::None),
        ],
    }
}

/// Validated `concrete key -> parents` table.
#[derive(Debug, Clone, Default)]
pub struct CategoryHierarchy {
    parents: BTreeMap<CategoryKey, Vec<CategoryKey>>,
}

impl CategoryHierarchy {
    /// Builds the table for the given concrete keys using [`derive_parents`].
    pub fn from_keys<'a, I>(keys: I) -> Result<Self, HierarchyError>
    where
        I: IntoIterator<Item = &'a CategoryKey>,
    {
        let mut hierarchy = Self::default();
        for key in keys {
            if !hierarchy.parents.contains_key(key) {
                hierarchy.insert(key.clone(), derive_parents(key))?;
            }
        }
        Ok(hierarchy)
    }

    /// Builds the table for every category stored in the dataset.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, HierarchyError> {
        Self::from_keys(dataset.buckets().map(|(_, key, _)| key))
    }

    /// Declares the parents of one concrete key, replacing any previous entry.
    pub fn insert(
        &mut self,
        child: CategoryKey,
        parents: Vec<CategoryKey>,
    ) -> Result<(), HierarchyError> {
        validate(&child, &parents)?;
        self.parents.insert(child, parents);
        Ok(())
    }

    /// Parents of `key`, empty when the key is not declared.
    #[must_use]
    pub fn parents(&self, key: &CategoryKey) -> &[CategoryKey] {
        self.parents.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn children(&self) -> impl Iterator<Item = &CategoryKey> {
        self.parents.keys()
    }
}

fn validate(child: &CategoryKey, parents: &[CategoryKey]) -> Result<(), HierarchyError> {
    if !child.is_concrete() {
        return Err(HierarchyError::NotConcrete {
            child: child.clone(),
        });
    }
    let mut seen = BTreeSet::new();
    for parent in parents {
        if parent == child {
            return Err(HierarchyError::ParentIsChild {
                child: child.clone(),
            });
        }
        if parent.class() != child.class() {
            return Err(HierarchyError::ClassCrossing {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
        if !seen.insert(parent) {
            return Err(HierarchyError::DuplicateParent {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(channel: &str, mass: u32, spin: i32) -> CategoryKey {
        CategoryKey::stored(channel, SampleId::Signal { mass }, Some(spin))
    }

    #[test]
    fn test_signal_has_seven_distinct_signal_parents() {
        let child = signal("A", 300, 0);
        let parents = derive_parents(&child);
        assert_eq!(parents.len(), 7);
        assert_eq!(parents.iter().collect::<BTreeSet<_>>().len(), 7);
        assert!(parents.iter().all(|p| p.class() == SampleClass::Signal));
        assert!(parents.iter().all(|p| *p != child && !p.is_concrete()));
    }

    #[test]
    fn test_background_collapses_channel_and_mass_only() {
        let child = CategoryKey::stored("A", SampleId::Background { pseudo_mass: 300 }, None);
        let parents = derive_parents(&child);
        assert_eq!(parents.len(), 3);
        assert!(parents.iter().all(|p| p.spin == Spin::None));
        assert!(parents.iter().all(|p| p.class() == SampleClass::Background));
    }

    #[test]
    fn test_from_keys_validates_every_entry() {
        let keys = [
            signal("A", 300, 0),
            signal("B", 300, 2),
            CategoryKey::stored("A", SampleId::SignalNonResonant, Some(0)),
            CategoryKey::stored("A", SampleId::Background { pseudo_mass: 0 }, None),
        ];
        let hierarchy = CategoryHierarchy::from_keys(&keys).unwrap();
        assert_eq!(hierarchy.children().count(), 4);
        assert_eq!(hierarchy.parents(&keys[0]).len(), 7);
        assert!(hierarchy.parents(&derive_parents(&keys[0])[0]).is_empty());
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let child = signal("A", 300, 0);
        let mut hierarchy = CategoryHierarchy::default();

        let err = hierarchy
            .insert(child.clone(), vec![child.clone()])
            .unwrap_err();
        assert!(matches!(err, HierarchyError::ParentIsChild { .. }));

        let parent = CategoryKey::new(Channel::Any, SampleId::AnyMass, Spin::Any);
        let err = hierarchy
            .insert(child.clone(), vec![parent.clone(), parent])
            .unwrap_err();
        assert!(matches!(err, HierarchyError::DuplicateParent { .. }));

        let crossing = CategoryKey::new(Channel::Any, SampleId::BackgroundAll, Spin::None);
        let err = hierarchy.insert(child, vec![crossing]).unwrap_err();
        assert!(matches!(err, HierarchyError::ClassCrossing { .. }));

        let aggregate = CategoryKey::new(Channel::Any, SampleId::AnyMass, Spin::Any);
        let err = hierarchy.insert(aggregate, vec![]).unwrap_err();
        assert!(matches!(err, HierarchyError::NotConcrete { .. }));
    }
}
