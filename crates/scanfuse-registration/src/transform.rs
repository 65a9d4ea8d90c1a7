//! Rigid transforms between scanner frames.
//!
//! A [`Transform`] relates two frames with an axis-aligned [`Rotation`] and
//! an integer translation.  Transforms compose like the frames they link:
//! if `a_b` maps frame B into frame A and `b_c` maps C into B, then
//! `a_b.compose(b_c)` maps C straight into A.
//!
//! # Example
//!
//! ```rust
//! use scanfuse_registration::rotation::Rotation;
//! use scanfuse_registration::transform::Transform;
//! use scanfuse_types::Point3;
//!
//! let quarter_z = Rotation::from_parts([1, 0, 2], [-1, 1, 1]).unwrap();
//!
//! // Scanner B sits at (5, 5, 5) in A's frame, turned 90° about Z.
//! let a_b = Transform::new(quarter_z, Point3::new(5, 5, 5));
//!
//! // B sees a beacon 1 unit along its own +X axis.
//! assert_eq!(a_b.apply(Point3::new(1, 0, 0)), Point3::new(5, 6, 5));
//! assert_eq!(a_b.inverse().apply(Point3::new(5, 6, 5)), Point3::new(1, 0, 0));
//! ```

use scanfuse_types::Point3;

use crate::rotation::Rotation;

// ────────────────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body transform: rotation followed by translation.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by `rotation` then add
/// `translation`.  The translation is therefore B's origin seen from A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transform {
    pub rotation: Rotation,
    pub translation: Point3,
}

impl Transform {
    pub fn new(rotation: Rotation, translation: Point3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Rotation::identity(), Point3::origin())
    }

    /// Map a point from the child frame into the parent frame.
    pub fn apply(self, p: Point3) -> Point3 {
        self.rotation.apply(p).add(self.translation)
    }

    /// Chain two transforms.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C: the child
    /// rotation is applied first, then the parent rotation, then the parent
    /// translation.
    pub fn compose(self, other: Self) -> Self {
        let translation = self.translation.add(self.rotation.apply(other.translation));
        Self::new(self.rotation.compose(other.rotation), translation)
    }

    /// T_B_A from T_A_B.
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.inverse();
        let translation = Point3::origin().sub(rotation.apply(self.translation));
        Self::new(rotation, translation)
    }

    /// [`Transform::apply`] that reports `i32` overflow instead of panicking.
    pub fn checked_apply(self, p: Point3) -> Option<Point3> {
        self.rotation.checked_apply(p)?.checked_add(self.translation)
    }

    /// [`Transform::compose`] that reports `i32` overflow instead of panicking.
    pub fn checked_compose(self, other: Self) -> Option<Self> {
        let translation = self.checked_apply(other.translation)?;
        Some(Self::new(self.rotation.compose(other.rotation), translation))
    }

    /// [`Transform::inverse`] that reports `i32` overflow instead of panicking.
    pub fn checked_inverse(self) -> Option<Self> {
        let rotation = self.rotation.inverse();
        let t = rotation.checked_apply(self.translation)?;
        let translation = Point3::new(t.x.checked_neg()?, t.y.checked_neg()?, t.z.checked_neg()?);
        Some(Self::new(rotation, translation))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
