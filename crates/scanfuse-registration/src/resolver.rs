//! Rotation resolution for one overlap edge.
//!
//! A [`Correspondence`] says that beacon pair `{a1, a2}` in scanner A and pair
//! `{b1, b2}` in scanner B are the same two beacons, but not whether `a1` is
//! `b1` or `b2`.  The resolver settles that with a third beacon `c` of A: the
//! distance `|a1 − c|²` must also appear in B, and the B pair holding it
//! names `a1`'s partner.
//!
//! With the matched anchors in hand every one of the 24 rotations is tried:
//! the first anchor fixes the translation and all anchors must then line up
//! exactly.  Exactly one rotation may pass.
//!
//! Only the first [`WITNESS_CORRESPONDENCES`] correspondences are used as
//! anchors.  An adversarial collision among those three can still mislead
//! the search; verifying the full correspondence set would catch it at a
//! much higher cost per edge.

use std::collections::BTreeSet;

use scanfuse_types::{Point3, ScanError};
use tracing::debug;

use crate::fingerprint::Fingerprint;
use crate::overlap::{Correspondence, OverlapEdge};
use crate::rotation::Rotation;
use crate::transform::Transform;

/// How many correspondences are turned into anchor matches.
pub const WITNESS_CORRESPONDENCES: usize = 3;

/// Find the transform that maps `edge.to`'s frame into `edge.from`'s.
///
/// `from` and `to` are the fingerprints of the edge's two scanners.  The
/// returned translation is `edge.to`'s position in `edge.from`'s frame.
pub fn resolve(
    from: &Fingerprint,
    to: &Fingerprint,
    edge: &OverlapEdge,
) -> Result<Transform, ScanError> {
    let unresolved = ScanError::UnresolvedCorrespondence {
        from: edge.from,
        to: edge.to,
    };
    debug_assert_eq!(from.scanner(), edge.from);
    debug_assert_eq!(to.scanner(), edge.to);

    let implicated = edge.implicated_points();
    let mut anchors: Vec<(Point3, Point3)> = Vec::new();
    for correspondence in edge.correspondences.iter().take(WITNESS_CORRESPONDENCES) {
        let matched = orient(correspondence, &implicated, to).ok_or_else(|| unresolved.clone())?;
        for anchor in matched {
            if !anchors.contains(&anchor) {
                anchors.push(anchor);
            }
        }
    }
    let Some(&(a0, b0)) = anchors.first() else {
        return Err(unresolved);
    };

    let candidates: Vec<Transform> = Rotation::all()
        .filter_map(|rotation| {
            let transform = Transform::new(rotation, a0.sub(rotation.apply(b0)));
            anchors
                .iter()
                .all(|&(a, b)| transform.apply(b) == a)
                .then_some(transform)
        })
        .collect();

    debug!(
        from = edge.from,
        to = edge.to,
        anchors = anchors.len(),
        candidates = candidates.len(),
        "resolved rotation candidates"
    );

    match candidates.as_slice() {
        [transform] => Ok(*transform),
        [] => Err(ScanError::NoRotationFound {
            from: edge.from,
            to: edge.to,
        }),
        many => Err(ScanError::AmbiguousRotation {
            from: edge.from,
            to: edge.to,
            candidates: many.len(),
        }),
    }
}

/// Decide which end of the B pair matches which end of the A pair.
///
/// Returns the two `(a, b)` matches, or `None` when no third implicated
/// beacon of A yields an unambiguous distance pointing at either end.
fn orient(
    correspondence: &Correspondence,
    implicated: &BTreeSet<Point3>,
    to: &Fingerprint,
) -> Option<[(Point3, Point3); 2]> {
    let (a1, a2) = (correspondence.first.first, correspondence.first.second);
    let (b1, b2) = (correspondence.second.first, correspondence.second.second);

    implicated
        .iter()
        .filter(|&&c| c != a1 && c != a2)
        .find_map(|&c| {
            let pair = to.unique_pair(a1.squared_distance(c))?;
            match (pair.contains(b1), pair.contains(b2)) {
                (true, false) => Some([(a1, b1), (a2, b2)]),
                (false, true) => Some([(a1, b2), (a2, b1)]),
                _ => None,
            }
        })
}
