//! Frame assembly.
//!
//! Walks the [`OverlapGraph`] breadth-first from a root scanner, resolving
//! each edge it crosses and chaining the result onto the parent's placement,
//! so every scanner ends up expressed in the root's frame.
//!
//! Bookkeeping is an explicit worklist of `(report index, placement)`
//! entries plus an arena of [`ScannerPlacement`]s indexed by report.  Each scanner moves
//! `Unvisited → Queued → Placed` exactly once; a placement is never revised
//! once written.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use scanfuse_types::{Point3, ScanError, ScannerId, ScannerReport};
use tracing::{debug, info, instrument};

use crate::fingerprint::Fingerprint;
use crate::overlap::OverlapGraph;
use crate::resolver::resolve;
use crate::transform::Transform;

// ────────────────────────────────────────────────────────────────────────────
// ScannerPlacement
// ────────────────────────────────────────────────────────────────────────────

/// Where a scanner sits, and how it is turned, in the root frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerPlacement {
    pub scanner: ScannerId,
    /// Maps the scanner's local frame into the root frame.
    pub transform: Transform,
    /// The already-placed scanner this one was resolved against; `None` for
    /// the root.
    pub parent: Option<ScannerId>,
}

impl ScannerPlacement {
    fn root(scanner: ScannerId) -> Self {
        Self {
            scanner,
            transform: Transform::identity(),
            parent: None,
        }
    }

    /// The scanner's position in the root frame.
    pub fn position(&self) -> Point3 {
        self.transform.translation
    }
}

// ────────────────────────────────────────────────────────────────────────────
// GlobalFrame
// ────────────────────────────────────────────────────────────────────────────

/// The assembled map: every scanner placed and every beacon deduplicated in
/// the root frame.  Read-only once built; see the query methods in
/// [`crate::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFrame {
    root: ScannerId,
    /// One placement per report, in input order.
    placements: Vec<ScannerPlacement>,
    index: BTreeMap<ScannerId, usize>,
    beacons: BTreeSet<Point3>,
}

impl GlobalFrame {
    pub fn root(&self) -> ScannerId {
        self.root
    }

    /// Placements in input order.
    pub fn placements(&self) -> &[ScannerPlacement] {
        &self.placements
    }

    pub fn placement(&self, scanner: ScannerId) -> Option<&ScannerPlacement> {
        self.index.get(&scanner).map(|&i| &self.placements[i])
    }

    /// Every distinct beacon in root coordinates.
    pub fn beacons(&self) -> &BTreeSet<Point3> {
        &self.beacons
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FrameAssembler
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Queued,
    Placed,
}

/// Map each scanner id to its position in `reports`.
///
/// Fails on an empty input, a repeated id or a beacon outside
/// [`COORDINATE_LIMIT`](scanfuse_types::COORDINATE_LIMIT).
pub fn index_reports(reports: &[ScannerReport]) -> Result<BTreeMap<ScannerId, usize>, ScanError> {
    if reports.is_empty() {
        return Err(ScanError::NoReports);
    }
    let mut index = BTreeMap::new();
    for (i, report) in reports.iter().enumerate() {
        if index.insert(report.id(), i).is_some() {
            return Err(ScanError::DuplicateScannerId(report.id()));
        }
        report.check_coordinates()?;
    }
    Ok(index)
}

/// Places every report in the frame of a chosen root.
///
/// `fingerprints[i]` must belong to `reports[i]`, and `graph` must have been
/// detected from those fingerprints.
#[derive(Debug)]
pub struct FrameAssembler<'a> {
    reports: &'a [ScannerReport],
    fingerprints: &'a [Fingerprint],
    graph: &'a OverlapGraph,
    index: BTreeMap<ScannerId, usize>,
}

impl<'a> FrameAssembler<'a> {
    pub fn new(
        reports: &'a [ScannerReport],
        fingerprints: &'a [Fingerprint],
        graph: &'a OverlapGraph,
    ) -> Result<Self, ScanError> {
        debug_assert_eq!(reports.len(), fingerprints.len());
        Ok(Self {
            reports,
            fingerprints,
            graph,
            index: index_reports(reports)?,
        })
    }

    /// Run the breadth-first placement from `root`.
    ///
    /// Any scanner the root cannot reach through overlap edges makes the
    /// whole assembly fail with [`ScanError::Disconnected`].
    #[instrument(skip(self), fields(scanners = self.reports.len()))]
    pub fn assemble(&self, root: ScannerId) -> Result<GlobalFrame, ScanError> {
        let root_index = *self
            .index
            .get(&root)
            .ok_or(ScanError::UnknownScanner(root))?;

        let n = self.reports.len();
        let mut state = vec![VisitState::Unvisited; n];
        let mut arena: Vec<Option<ScannerPlacement>> = vec![None; n];
        let mut beacons = BTreeSet::new();
        let mut queue = VecDeque::new();

        let root_placement = ScannerPlacement::root(root);
        self.absorb(root_index, &root_placement, &mut beacons)?;
        arena[root_index] = Some(root_placement);
        state[root_index] = VisitState::Placed;
        queue.push_back((root_index, root_placement));

        while let Some((current, parent)) = queue.pop_front() {
            for edge in self.graph.edges_from(parent.scanner) {
                let Some(&next) = self.index.get(&edge.to) else {
                    continue;
                };
                if state[next] != VisitState::Unvisited {
                    continue;
                }
                state[next] = VisitState::Queued;

                let relative = resolve(&self.fingerprints[current], &self.fingerprints[next], edge)?;
                let transform = parent
                    .transform
                    .checked_compose(relative)
                    .ok_or(ScanError::CoordinateOverflow { scanner: edge.to })?;
                let placement = ScannerPlacement {
                    scanner: edge.to,
                    transform,
                    parent: Some(parent.scanner),
                };
                debug!(
                    scanner = placement.scanner,
                    parent = parent.scanner,
                    position = %placement.position(),
                    "placed scanner"
                );
                self.absorb(next, &placement, &mut beacons)?;
                arena[next] = Some(placement);
                state[next] = VisitState::Placed;
                queue.push_back((next, placement));
            }
        }

        let unreached: Vec<ScannerId> = state
            .iter()
            .zip(self.reports)
            .filter(|(s, _)| **s != VisitState::Placed)
            .map(|(_, report)| report.id())
            .collect();
        if !unreached.is_empty() {
            return Err(ScanError::Disconnected { unreached });
        }

        let placements: Vec<ScannerPlacement> = arena.into_iter().flatten().collect();
        info!(
            root,
            placed = placements.len(),
            beacons = beacons.len(),
            "frame assembly complete"
        );
        Ok(GlobalFrame {
            root,
            placements,
            index: self.index.clone(),
            beacons,
        })
    }

    /// Add a placed scanner's beacons, moved into the root frame.
    fn absorb(
        &self,
        index: usize,
        placement: &ScannerPlacement,
        beacons: &mut BTreeSet<Point3>,
    ) -> Result<(), ScanError> {
        for &p in self.reports[index].beacons() {
            let global = placement
                .transform
                .checked_apply(p)
                .ok_or(ScanError::CoordinateOverflow {
                    scanner: placement.scanner,
                })?;
            beacons.insert(global);
        }
        Ok(())
    }
}
