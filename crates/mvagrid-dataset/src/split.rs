use crate::{fold::Fold, random::DrawStream};

/// Default number of sets events are spread over before one is held out.
pub const DEFAULT_NUMBER_SETS: u32 = 4;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("test set {which_test} is outside 0..{number_sets}")]
pub struct InvalidTestSetError {
    pub which_test: u32,
    pub number_sets: u32,
}

/// Random train/test fold assignment.
///
/// Each event draws a set index uniformly in `0..number_sets`. The event is held
/// out for testing when the draw equals `which_test`.
#[derive(Debug, Clone)]
pub struct FoldSplitter {
    number_sets: u32,
    which_test: u32,
    stream: DrawStream,
}

impl FoldSplitter {
    pub fn new(
        number_sets: u32,
        which_test: u32,
        stream: DrawStream,
    ) -> Result<Self, InvalidTestSetError> {
        if which_test >= number_sets {
            return Err(InvalidTestSetError {
                which_test,
                number_sets,
            });
        }
        Ok(Self {
            number_sets,
            which_test,
            stream,
        })
    }

    #[must_use]
    pub fn which_test(&self) -> u32 {
        self.which_test
    }

    pub fn assign(&mut self, event_key: u64) -> Fold {
        let set = self.stream.index(event_key, self.number_sets as usize);
        if set == self.which_test as usize {
            Fold::Testing
        } else {
            Fold::Training
        }
    }
}

/// Blind/unblind half-split on the event's split id.
///
/// Independent of the train/test fold: it decides whether an event is read at
/// all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blinding {
    /// Keep events with `split_id < n_splits / 2`.
    #[default]
    Blind,
    /// Keep the complementary half.
    Unblind,
}

impl Blinding {
    #[must_use]
    pub fn accepts(self, split_id: u32, n_splits: u32) -> bool {
        let in_first_half = split_id < n_splits / 2;
        match self {
            Self::Blind => in_first_half,
            Self::Unblind => !in_first_half,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roughly_one_set_held_out() {
        let mut splitter = FoldSplitter::new(4, 1, DrawStream::sequential(9)).unwrap();
        let testing = (0..8000)
            .filter(|&i| splitter.assign(i).is_testing())
            .count();
        assert!((1700..2300).contains(&testing), "{testing}");
    }

    #[test]
    fn test_invalid_test_set() {
        assert!(FoldSplitter::new(4, 4, DrawStream::sequential(0)).is_err());
    }

    #[test]
    fn test_blinding_halves_are_complementary() {
        for split_id in 0..10 {
            assert_ne!(
                Blinding::Blind.accepts(split_id, 10),
                Blinding::Unblind.accepts(split_id, 10)
            );
        }
        assert!(Blinding::Blind.accepts(4, 10));
        assert!(!Blinding::Blind.accepts(5, 10));
    }
}
