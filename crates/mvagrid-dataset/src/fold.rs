use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Train/test partition an event belongs to.
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
#[serde(rename_all = "snake_case")]
pub enum Fold {
    /// Events used to fit the classifier.
    #[display("training")]
    Training,
    /// Held-out events.
    #[display("testing")]
    Testing,
}

impl Fold {
    pub const ALL: [Self; 2] = [Self::Training, Self::Testing];
}

/// One value per fold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoldPair<T> {
    pub training: T,
    pub testing: T,
}

impl<T> FoldPair<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Fold, &T)> {
        [(Fold::Training, &self.training), (Fold::Testing, &self.testing)].into_iter()
    }

    pub fn map<U, F>(&self, mut f: F) -> FoldPair<U>
    where
        F: FnMut(Fold, &T) -> U,
    {
        FoldPair {
            training: f(Fold::Training, &self.training),
            testing: f(Fold::Testing, &self.testing),
        }
    }
}

impl<T> Index<Fold> for FoldPair<T> {
    type Output = T;

    fn index(&self, fold: Fold) -> &T {
        match fold {
            Fold::Training => &self.training,
            Fold::Testing => &self.testing,
        }
    }
}

impl<T> IndexMut<Fold> for FoldPair<T> {
    fn index_mut(&mut self, fold: Fold) -> &mut T {
        match fold {
            Fold::Training => &mut self.training,
            Fold::Testing => &mut self.testing,
        }
    }
}
