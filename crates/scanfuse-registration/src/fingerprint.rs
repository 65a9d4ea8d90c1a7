//! Distance fingerprints.
//!
//! The squared distance between two beacons does not change when a scanner
//! is rotated or moved, so the set of pairwise squared distances is a
//! frame-independent signature of what a scanner sees.  A [`Fingerprint`]
//! indexes every pair of beacons in one report by that distance.  It is built
//! once per report and only read afterwards.

use std::collections::BTreeMap;

use scanfuse_types::{Point3, ScannerId, ScannerReport};

/// An unordered pair of beacons, stored with `first <= second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointPair {
    pub first: Point3,
    pub second: Point3,
}

impl PointPair {
    pub fn new(a: Point3, b: Point3) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn contains(&self, p: Point3) -> bool {
        self.first == p || self.second == p
    }

    pub fn squared_length(&self) -> i64 {
        self.first.squared_distance(self.second)
    }
}

/// Squared distance → every beacon pair of one report at that distance.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    scanner: ScannerId,
    beacon_count: usize,
    pairs: BTreeMap<i64, Vec<PointPair>>,
}

impl Fingerprint {
    /// Index all `n·(n−1)/2` beacon pairs of `report`.
    pub fn build(report: &ScannerReport) -> Self {
        let beacons: Vec<Point3> = report.beacons().iter().copied().collect();
        let mut pairs: BTreeMap<i64, Vec<PointPair>> = BTreeMap::new();
        for (i, &a) in beacons.iter().enumerate() {
            for &b in &beacons[i + 1..] {
                pairs
                    .entry(a.squared_distance(b))
                    .or_default()
                    .push(PointPair::new(a, b));
            }
        }
        Self {
            scanner: report.id(),
            beacon_count: beacons.len(),
            pairs,
        }
    }

    pub fn scanner(&self) -> ScannerId {
        self.scanner
    }

    pub fn beacon_count(&self) -> usize {
        self.beacon_count
    }

    /// Number of distinct distance values.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All pairs at `distance`, empty when none.
    pub fn pairs_at(&self, distance: i64) -> &[PointPair] {
        self.pairs.get(&distance).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The pair at `distance` when exactly one pair produces it.
    ///
    /// Repeated distances cannot say which pair is meant, so they never serve
    /// as evidence.
    pub fn unique_pair(&self, distance: i64) -> Option<PointPair> {
        match self.pairs_at(distance) {
            [pair] => Some(*pair),
            _ => None,
        }
    }

    /// Iterate `(distance, pair)` for every unambiguous distance, ascending.
    pub fn unique_pairs(&self) -> impl Iterator<Item = (i64, PointPair)> + '_ {
        self.pairs.iter().filter_map(|(&d, pairs)| match pairs.as_slice() {
            [pair] => Some((d, *pair)),
            _ => None,
        })
    }
}
