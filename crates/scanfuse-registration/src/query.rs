//! Read-only reductions over an assembled [`GlobalFrame`].

use scanfuse_types::{Point3, ScanError, ScannerId};
use serde::{Deserialize, Serialize};

use crate::assembler::GlobalFrame;
use crate::transform::Transform;

/// The two headline answers for a scan set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub beacon_count: usize,
    pub max_manhattan_distance: i64,
}

impl GlobalFrame {
    /// Number of distinct beacons in the root frame.
    pub fn beacon_count(&self) -> usize {
        self.beacons().len()
    }

    /// Scanner positions in the root frame, in input order.
    pub fn scanner_positions(&self) -> Vec<Point3> {
        self.placements().iter().map(|p| p.position()).collect()
    }

    /// Largest Manhattan distance between any two scanner positions.
    ///
    /// Exhaustive pairwise scan; scanner counts are small.  A lone scanner
    /// yields 0.
    pub fn max_manhattan_distance(&self) -> i64 {
        let positions = self.scanner_positions();
        positions
            .iter()
            .enumerate()
            .flat_map(|(i, a)| positions[i + 1..].iter().map(move |b| a.manhattan_distance(*b)))
            .max()
            .unwrap_or(0)
    }

    /// The transform mapping scanner `to`'s frame into scanner `from`'s.
    pub fn relative_transform(&self, from: ScannerId, to: ScannerId) -> Result<Transform, ScanError> {
        let from = self.placement(from).ok_or(ScanError::UnknownScanner(from))?;
        let to = self.placement(to).ok_or(ScanError::UnknownScanner(to))?;
        from.transform
            .checked_inverse()
            .and_then(|inverse| inverse.checked_compose(to.transform))
            .ok_or(ScanError::CoordinateOverflow { scanner: to.scanner })
    }

    pub fn summary(&self) -> Summary {
        Summary {
            beacon_count: self.beacon_count(),
            max_manhattan_distance: self.max_manhattan_distance(),
        }
    }
}
