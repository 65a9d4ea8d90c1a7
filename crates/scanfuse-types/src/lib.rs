use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a scanner within one scan set.
pub type ScannerId = u32;

/// Largest absolute coordinate a report may carry (2^29).
///
/// Within this range the difference of two points fits in 31 bits, so
/// squared distances stay inside `i64` and a point rotated and then shifted
/// by a pair-local offset stays inside `i32`.
pub const COORDINATE_LIMIT: i32 = 1 << 29;

/// An exact integer point in 3-D space.
///
/// Serialised as a plain `[x, y, z]` array so scan documents stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    /// Create a new point.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The origin `(0, 0, 0)`.
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// Coordinates as an array, indexed by axis (x = 0, y = 1, z = 2).
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Component-wise sum.  Panics on `i32` overflow like `+`; see
    /// [`Point3::checked_add`] for root-frame accumulation.
    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Component-wise sum, `None` if any axis leaves `i32`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
            self.z.checked_add(rhs.z)?,
        ))
    }

    /// `true` when every coordinate lies in `-COORDINATE_LIMIT..=COORDINATE_LIMIT`.
    pub fn within_limit(self) -> bool {
        self.to_array().iter().all(|c| c.unsigned_abs() <= COORDINATE_LIMIT.unsigned_abs())
    }

    /// Squared Euclidean distance.  Unchanged by any axis rotation and by
    /// translation, which makes it the overlap fingerprint value.
    ///
    /// Exact for points within [`COORDINATE_LIMIT`].
    pub fn squared_distance(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Manhattan (taxicab) distance.
    pub fn manhattan_distance(self, other: Self) -> i64 {
        (i64::from(self.x) - i64::from(other.x)).abs()
            + (i64::from(self.y) - i64::from(other.y)).abs()
            + (i64::from(self.z) - i64::from(other.z)).abs()
    }
}

impl From<[i32; 3]> for Point3 {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for [i32; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

impl JsonSchema for Point3 {
    fn schema_name() -> String {
        "Point3".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <[i32; 3]>::json_schema(generator)
    }
}

/// The beacons one scanner observed, expressed in that scanner's own frame.
///
/// Reports are created once from external input and never mutated; the
/// beacon set is deduplicated and ordered by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScannerReport {
    id: ScannerId,
    beacons: BTreeSet<Point3>,
}

impl ScannerReport {
    pub fn new(id: ScannerId, beacons: impl IntoIterator<Item = Point3>) -> Self {
        Self {
            id,
            beacons: beacons.into_iter().collect(),
        }
    }

    pub fn id(&self) -> ScannerId {
        self.id
    }

    pub fn beacons(&self) -> &BTreeSet<Point3> {
        &self.beacons
    }

    /// Number of distinct beacons in the report.
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    /// Reject a report holding a beacon outside [`COORDINATE_LIMIT`].
    pub fn check_coordinates(&self) -> Result<(), ScanError> {
        match self.beacons.iter().find(|p| !p.within_limit()) {
            Some(p) => Err(ScanError::MalformedReport {
                id: self.id,
                reason: format!("beacon {p} outside ±{COORDINATE_LIMIT}"),
            }),
            None => Ok(()),
        }
    }

    /// Same beacons under a different id.
    pub fn relabeled(&self, id: ScannerId) -> Self {
        Self {
            id,
            beacons: self.beacons.clone(),
        }
    }
}

/// Every failure the registration pipeline can report.
///
/// All of them are deterministic functions of the input: retrying with the
/// same scan set always fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanError {
    #[error("Malformed report from scanner {id}: {reason}")]
    MalformedReport { id: ScannerId, reason: String },

    #[error("Duplicate scanner id {0}")]
    DuplicateScannerId(ScannerId),

    #[error("No scanner reports supplied")]
    NoReports,

    #[error("Unknown scanner {0}")]
    UnknownScanner(ScannerId),

    #[error("Overlap graph is disconnected; unreachable scanners: {unreached:?}")]
    Disconnected { unreached: Vec<ScannerId> },

    #[error("Cannot pair up correspondences between scanners {from} and {to}")]
    UnresolvedCorrespondence { from: ScannerId, to: ScannerId },

    #[error("No rotation aligns scanner {to} with scanner {from}")]
    NoRotationFound { from: ScannerId, to: ScannerId },

    #[error("{candidates} rotations align scanner {to} with scanner {from}")]
    AmbiguousRotation {
        from: ScannerId,
        to: ScannerId,
        candidates: usize,
    },

    #[error("Placing scanner {scanner} moves coordinates out of i32 range")]
    CoordinateOverflow { scanner: ScannerId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point3::new(1, -2, 3);
        let b = Point3::new(4, 5, -6);
        assert_eq!(a.add(b), Point3::new(5, 3, -3));
        assert_eq!(b.sub(a), Point3::new(3, 7, -9));
        assert_eq!(a.squared_distance(b), 9 + 49 + 81);
        assert_eq!(a.manhattan_distance(b), 3 + 7 + 9);
        assert_eq!(a.add(Point3::origin()), a);
    }

    #[test]
    fn squared_distance_is_exact_across_the_coordinate_range() {
        let high = Point3::new(COORDINATE_LIMIT, COORDINATE_LIMIT, COORDINATE_LIMIT);
        let low = Point3::new(-COORDINATE_LIMIT, -COORDINATE_LIMIT, -COORDINATE_LIMIT);
        // Each axis differs by 2^30.
        assert_eq!(high.squared_distance(low), 3 * (1_i64 << 60));
        assert_eq!(high.manhattan_distance(low), 3 * (1_i64 << 30));
    }

    #[test]
    fn checked_add_reports_overflow() {
        let p = Point3::new(i32::MAX, 0, 0);
        assert_eq!(p.checked_add(Point3::new(1, 0, 0)), None);
        assert_eq!(
            p.checked_add(Point3::new(-1, 2, 3)),
            Some(Point3::new(i32::MAX - 1, 2, 3))
        );
    }

    #[test]
    fn report_coordinates_are_bounded() {
        let ok = ScannerReport::new(1, [Point3::new(COORDINATE_LIMIT, -COORDINATE_LIMIT, 0)]);
        assert!(ok.check_coordinates().is_ok());

        let extreme = ScannerReport::new(2, [Point3::new(0, 0, 0), Point3::new(i32::MIN, 0, 0)]);
        match extreme.check_coordinates() {
            Err(ScanError::MalformedReport { id, reason }) => {
                assert_eq!(id, 2);
                assert!(reason.contains("outside"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn point_serializes_as_array() {
        let json = serde_json::to_string(&Point3::new(404, -588, -901)).unwrap();
        assert_eq!(json, "[404,-588,-901]");
        let back: Point3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Point3::new(404, -588, -901));
    }

    #[test]
    fn report_deduplicates_beacons() {
        let report = ScannerReport::new(
            3,
            [Point3::new(1, 1, 1), Point3::new(1, 1, 1), Point3::new(0, 0, 0)],
        );
        assert_eq!(report.id(), 3);
        assert_eq!(report.len(), 2);
        assert!(!report.is_empty());
        assert_eq!(report.relabeled(9).beacons(), report.beacons());
        assert_eq!(report.relabeled(9).id(), 9);
    }

    #[test]
    fn report_deserializes_from_document_shape() {
        let report: ScannerReport =
            serde_json::from_str(r#"{"id":1,"beacons":[[1,2,3],[-1,-2,-3]]}"#).unwrap();
        assert_eq!(report.id(), 1);
        assert!(report.beacons().contains(&Point3::new(-1, -2, -3)));
    }

    #[test]
    fn scan_error_display() {
        let err = ScanError::Disconnected { unreached: vec![2, 4] };
        assert!(err.to_string().contains("[2, 4]"));

        let err = ScanError::AmbiguousRotation {
            from: 0,
            to: 1,
            candidates: 2,
        };
        assert!(err.to_string().contains("2 rotations"));
    }

    #[test]
    fn scan_error_roundtrip() {
        let err = ScanError::MalformedReport {
            id: 7,
            reason: "only 2 beacons".to_string(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: ScanError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
