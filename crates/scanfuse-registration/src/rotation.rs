//! The 24-element group of axis-aligned rotations.
//!
//! Every rotation that maps the integer lattice onto itself permutes the
//! three axes and flips some of their signs.  Of the 48 permutation × sign
//! combinations exactly half are proper rotations (determinant +1); the other
//! half are mirror images and never occur between two physical scanners.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_registration::rotation::Rotation;
//! use scanfuse_types::Point3;
//!
//! // 90° about +Z: x → y, y → -x.
//! let quarter = Rotation::from_parts([1, 0, 2], [-1, 1, 1]).unwrap();
//! assert_eq!(quarter.apply(Point3::new(1, 0, 0)), Point3::new(0, 1, 0));
//! assert_eq!(quarter.compose(quarter.inverse()), Rotation::identity());
//! assert_eq!(Rotation::all().count(), 24);
//! ```

use scanfuse_types::Point3;

/// Every permutation of the axes paired with its parity.
const PERMUTATIONS: [([usize; 3], i32); 6] = [
    ([0, 1, 2], 1),
    ([0, 2, 1], -1),
    ([1, 0, 2], -1),
    ([1, 2, 0], 1),
    ([2, 0, 1], 1),
    ([2, 1, 0], -1),
];

/// An axis-aligned proper rotation.
///
/// Component `i` of a rotated point is `signs[i] * p[axes[i]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rotation {
    axes: [usize; 3],
    signs: [i32; 3],
}

impl Rotation {
    /// The identity rotation.
    pub const fn identity() -> Self {
        Self {
            axes: [0, 1, 2],
            signs: [1, 1, 1],
        }
    }

    /// Build a rotation from an axis permutation and per-axis signs.
    ///
    /// Returns `None` when `axes` is not a permutation of `0..3`, a sign is
    /// not ±1, or the combination is a reflection.
    pub fn from_parts(axes: [usize; 3], signs: [i32; 3]) -> Option<Self> {
        let parity = PERMUTATIONS
            .iter()
            .find(|(perm, _)| *perm == axes)
            .map(|(_, parity)| *parity)?;
        if signs.iter().any(|s| s.abs() != 1) {
            return None;
        }
        (parity * signs[0] * signs[1] * signs[2] == 1).then_some(Self { axes, signs })
    }

    /// All 24 rotations, identity first.
    pub fn all() -> impl Iterator<Item = Rotation> {
        PERMUTATIONS.into_iter().flat_map(|(axes, _)| {
            (0..8u8).filter_map(move |bits| {
                let sign = |bit: u8| if bits & bit == 0 { 1 } else { -1 };
                Rotation::from_parts(axes, [sign(1), sign(2), sign(4)])
            })
        })
    }

    /// Rotate a point.
    pub fn apply(self, p: Point3) -> Point3 {
        let c = p.to_array();
        Point3::new(
            self.signs[0] * c[self.axes[0]],
            self.signs[1] * c[self.axes[1]],
            self.signs[2] * c[self.axes[2]],
        )
    }

    /// Rotate a point, `None` when negating `i32::MIN` is required.
    pub fn checked_apply(self, p: Point3) -> Option<Point3> {
        let c = p.to_array();
        let axis = |i: usize| c[self.axes[i]].checked_mul(self.signs[i]);
        Some(Point3::new(axis(0)?, axis(1)?, axis(2)?))
    }

    /// `self ∘ other`: rotate by `other` first, then by `self`.
    pub fn compose(self, other: Self) -> Self {
        let mut axes = [0; 3];
        let mut signs = [0; 3];
        for i in 0..3 {
            axes[i] = other.axes[self.axes[i]];
            signs[i] = self.signs[i] * other.signs[self.axes[i]];
        }
        Self { axes, signs }
    }

    /// The rotation that undoes `self`.
    pub fn inverse(self) -> Self {
        let mut axes = [0; 3];
        let mut signs = [0; 3];
        for i in 0..3 {
            axes[self.axes[i]] = i;
            signs[self.axes[i]] = self.signs[i];
        }
        Self { axes, signs }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}
