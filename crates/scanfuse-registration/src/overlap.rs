//! Overlap detection.
//!
//! Two scanners that see the same beacons share the squared distances
//! between those beacons.  For every pair of reports the [`OverlapDetector`]
//! intersects their [`Fingerprint`]s; each shared, unambiguous distance is
//! one [`Correspondence`].  A pair with at least `threshold` correspondences
//! (12 by default) becomes an [`OverlapEdge`] of the [`OverlapGraph`].
//! Fewer than that is not an error, the pair simply stays unconnected.
//!
//! Pair evaluation only reads the fingerprints, so it fans out over rayon's
//! thread pool when [`OverlapDetector::parallel`] is set.  Results are
//! collected in pair order, which keeps the graph identical either way.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use scanfuse_types::{Point3, ScannerId};
use tracing::{debug, info};

use crate::fingerprint::{Fingerprint, PointPair};

/// Minimum number of correspondences for two scanners to count as
/// overlapping.
pub const OVERLAP_THRESHOLD: usize = 12;

// ────────────────────────────────────────────────────────────────────────────
// Correspondence / OverlapEdge
// ────────────────────────────────────────────────────────────────────────────

/// A pair of beacons in one scanner and a pair in another at the same
/// squared distance.  Which end matches which is not yet known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Correspondence {
    pub first: PointPair,
    pub second: PointPair,
}

impl Correspondence {
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }
}

/// Directed view of an overlap between `from` and `to`.
///
/// `correspondences[i].first` lies in `from`'s frame and `.second` in `to`'s.
/// The reverse view carries the same correspondences swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapEdge {
    pub from: ScannerId,
    pub to: ScannerId,
    pub correspondences: Vec<Correspondence>,
}

impl OverlapEdge {
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            correspondences: self.correspondences.iter().map(|c| c.swapped()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.correspondences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correspondences.is_empty()
    }

    /// Every beacon of `from` that takes part in some correspondence.
    pub fn implicated_points(&self) -> BTreeSet<Point3> {
        self.correspondences
            .iter()
            .flat_map(|c| [c.first.first, c.first.second])
            .collect()
    }
}

/// All correspondences between two fingerprints, in ascending distance order.
///
/// A distance repeated inside either scanner is skipped: its pairing cannot
/// be fixed, and skipping it keeps the result independent of point order.
pub fn correspondences(a: &Fingerprint, b: &Fingerprint) -> Vec<Correspondence> {
    a.unique_pairs()
        .filter_map(|(distance, first)| {
            b.unique_pair(distance)
                .map(|second| Correspondence { first, second })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// OverlapGraph
// ────────────────────────────────────────────────────────────────────────────

/// Undirected overlap relation, stored as both directed views per edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapGraph {
    /// `edges[from]` lists every edge leaving `from`.
    edges: BTreeMap<ScannerId, Vec<OverlapEdge>>,
}

impl OverlapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge in both directions.
    pub fn insert(&mut self, edge: OverlapEdge) {
        let reverse = edge.reversed();
        self.edges.entry(edge.from).or_default().push(edge);
        self.edges.entry(reverse.from).or_default().push(reverse);
    }

    /// Edges leaving `scanner`, empty for an isolated scanner.
    pub fn edges_from(&self, scanner: ScannerId) -> &[OverlapEdge] {
        self.edges.get(&scanner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The directed view `from → to`, if the two scanners overlap.
    pub fn edge(&self, from: ScannerId, to: ScannerId) -> Option<&OverlapEdge> {
        self.edges_from(from).iter().find(|e| e.to == to)
    }

    pub fn contains(&self, a: ScannerId, b: ScannerId) -> bool {
        self.edge(a, b).is_some()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OverlapDetector
// ────────────────────────────────────────────────────────────────────────────

/// Builds the [`OverlapGraph`] for a set of fingerprints.
///
/// # Example
///
/// ```rust
/// use scanfuse_registration::fingerprint::Fingerprint;
/// use scanfuse_registration::overlap::OverlapDetector;
/// use scanfuse_types::{Point3, ScannerReport};
///
/// // Two scanners with only four beacons each can never overlap.
/// let corner = [
///     Point3::new(0, 0, 0), Point3::new(1, 0, 0),
///     Point3::new(0, 2, 0), Point3::new(0, 0, 3),
/// ];
/// let fingerprints = [
///     Fingerprint::build(&ScannerReport::new(0, corner)),
///     Fingerprint::build(&ScannerReport::new(1, corner)),
/// ];
/// let graph = OverlapDetector::default().detect(&fingerprints);
/// assert!(graph.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapDetector {
    /// Minimum correspondences for an edge.
    pub threshold: usize,
    /// Evaluate scanner pairs on rayon's thread pool.
    pub parallel: bool,
}

impl Default for OverlapDetector {
    fn default() -> Self {
        Self {
            threshold: OVERLAP_THRESHOLD,
            parallel: true,
        }
    }
}

impl OverlapDetector {
    pub fn new(threshold: usize, parallel: bool) -> Self {
        Self {
            threshold,
            parallel,
        }
    }

    /// Evaluate one pair; `Some` when it reaches the threshold.
    ///
    /// Each correspondence uses a distinct beacon pair on both sides, so a
    /// scanner with fewer pairs than the threshold is skipped outright.
    pub fn evaluate_pair(&self, a: &Fingerprint, b: &Fingerprint) -> Option<OverlapEdge> {
        if pair_count(a) < self.threshold || pair_count(b) < self.threshold {
            return None;
        }
        let correspondences = correspondences(a, b);
        debug!(
            from = a.scanner(),
            to = b.scanner(),
            correspondences = correspondences.len(),
            "compared scanner pair"
        );
        (correspondences.len() >= self.threshold).then(|| OverlapEdge {
            from: a.scanner(),
            to: b.scanner(),
            correspondences,
        })
    }

    /// Compare every unordered pair of fingerprints.
    pub fn detect(&self, fingerprints: &[Fingerprint]) -> OverlapGraph {
        let pairs: Vec<(usize, usize)> = (0..fingerprints.len())
            .flat_map(|i| (i + 1..fingerprints.len()).map(move |j| (i, j)))
            .collect();

        let found: Vec<OverlapEdge> = if self.parallel {
            pairs
                .par_iter()
                .filter_map(|&(i, j)| self.evaluate_pair(&fingerprints[i], &fingerprints[j]))
                .collect()
        } else {
            pairs
                .iter()
                .filter_map(|&(i, j)| self.evaluate_pair(&fingerprints[i], &fingerprints[j]))
                .collect()
        };

        let mut graph = OverlapGraph::new();
        for edge in found {
            debug!(from = edge.from, to = edge.to, correspondences = edge.len(), "overlap edge");
            graph.insert(edge);
        }
        info!(
            scanners = fingerprints.len(),
            pairs = pairs.len(),
            edges = graph.edge_count(),
            "overlap detection complete"
        );
        graph
    }
}

/// Number of beacon pairs a fingerprint can offer.
fn pair_count(fingerprint: &Fingerprint) -> usize {
    let n = fingerprint.beacon_count();
    n * n.saturating_sub(1) / 2
}
