use serde::{Deserialize, Serialize};

use crate::{category::SampleId, random::DrawStream};

/// A signal-like `(mass, spin)` combination background events are spread over.
///
/// Non-resonant signal is represented by mass `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkingPoint {
    pub mass: u32,
    pub spin: i32,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("background assignment needs at least one working point")]
pub struct NoWorkingPointsError;

/// Assigns every background event to one signal working point, uniformly at
/// random.
#[derive(Debug, Clone)]
pub struct BackgroundAssigner {
    points: Vec<WorkingPoint>,
    stream: DrawStream,
}

impl BackgroundAssigner {
    pub fn new(points: Vec<WorkingPoint>, stream: DrawStream) -> Result<Self, NoWorkingPointsError> {
        if points.is_empty() {
            return Err(NoWorkingPointsError);
        }
        Ok(Self { points, stream })
    }

    #[must_use]
    pub fn points(&self) -> &[WorkingPoint] {
        &self.points
    }

    /// Draws the working point for the given event.
    pub fn draw(&mut self, event_key: u64) -> WorkingPoint {
        let i = self.stream.index(event_key, self.points.len());
        self.points[i]
    }

    /// Draws a working point and returns the pseudo sample id with the drawn
    /// spin.
    pub fn assign(&mut self, event_key: u64) -> (SampleId, i32) {
        let point = self.draw(event_key);
        (
            SampleId::Background {
                pseudo_mass: point.mass,
            },
            point.spin,
        )
    }
}
