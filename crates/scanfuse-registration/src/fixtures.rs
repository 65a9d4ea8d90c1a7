//! Shared test scenes.
//!
//! [`world`] is a field of 32 beacons whose 496 pairwise squared distances
//! are all different.  Scanners are carved out of it by [`observe`], which
//! expresses a slice of the world in the frame of a scanner placed by a
//! known transform.

use std::ops::Range;

use scanfuse_types::{Point3, ScannerId, ScannerReport};

use crate::rotation::Rotation;
use crate::transform::Transform;

const WORLD: [[i32; 3]; 32] = [
    [-425, 465, -571],
    [-178, -459, 314],
    [220, 267, 634],
    [77, -271, -508],
    [299, -642, 98],
    [186, 544, -696],
    [212, -155, -232],
    [510, -491, -50],
    [-638, -655, -648],
    [630, 408, -682],
    [80, -257, 164],
    [-641, 380, -246],
    [196, 315, 432],
    [-223, 7, -228],
    [686, -252, 241],
    [-107, -656, 152],
    [439, 615, -496],
    [-320, 588, -93],
    [-453, -19, 325],
    [164, 339, 672],
    [-312, -79, -119],
    [503, 322, 334],
    [105, 506, -630],
    [283, -203, 127],
    [148, 661, -346],
    [51, 423, 681],
    [67, -523, 198],
    [659, 341, -479],
    [-365, 366, 105],
    [58, 302, -640],
    [261, -611, -69],
    [559, 514, 484],
];

pub fn world() -> Vec<Point3> {
    WORLD.iter().map(|&c| Point3::from(c)).collect()
}

/// 90° about +Z: `(x, y, z) → (-y, x, z)`.
pub fn quarter_z() -> Rotation {
    Rotation::from_parts([1, 0, 2], [-1, 1, 1]).unwrap()
}

/// 90° about +X: `(x, y, z) → (x, -z, y)`.
pub fn quarter_x() -> Rotation {
    Rotation::from_parts([0, 2, 1], [1, -1, 1]).unwrap()
}

/// 90° about +Y: `(x, y, z) → (z, y, -x)`.
pub fn quarter_y() -> Rotation {
    Rotation::from_parts([2, 1, 0], [1, 1, -1]).unwrap()
}

/// World beacons `range` as seen by a scanner whose pose in the world is
/// `placement`.
pub fn observe(id: ScannerId, range: Range<usize>, placement: Transform) -> ScannerReport {
    let local = placement.inverse();
    ScannerReport::new(id, world()[range].iter().map(|&p| local.apply(p)))
}

/// Two 12-beacon scanners sharing exactly 11 squared distances: 5 common
/// beacons (10 distances) plus one pair of B's that happens to repeat a
/// distance of A's far away from everything else.
pub fn eleven_shared_distances() -> (ScannerReport, ScannerReport) {
    let w = world();
    let a = ScannerReport::new(0, w[0..12].iter().copied());

    let shared = Transform::new(quarter_z(), Point3::new(5, 5, 5)).inverse();
    let echo = Transform::new(quarter_y(), Point3::new(5000, 0, 0));
    let far = Transform::new(Rotation::identity(), Point3::new(-5000, 0, 0));
    let b = ScannerReport::new(
        1,
        w[0..5]
            .iter()
            .map(|&p| shared.apply(p))
            .chain(w[6..8].iter().map(|&p| echo.apply(p)))
            .chain(w[20..25].iter().map(|&p| far.apply(p))),
    );
    (a, b)
}
