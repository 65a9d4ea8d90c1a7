//! One-call registration pipeline: fingerprint → detect → assemble.

use std::time::Instant;

use rayon::prelude::*;
use scanfuse_types::{ScanError, ScannerId, ScannerReport};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::assembler::{FrameAssembler, GlobalFrame, index_reports};
use crate::fingerprint::Fingerprint;
use crate::overlap::{OVERLAP_THRESHOLD, OverlapDetector, OverlapGraph};
use crate::query::Summary;

/// Tunables for a registration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum correspondences for two scanners to overlap.
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: usize,

    /// Fingerprint and compare scanners on rayon's thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Scanner whose frame becomes the global frame.  The first report when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<ScannerId>,
}

fn default_overlap_threshold() -> usize {
    OVERLAP_THRESHOLD
}
fn default_parallel() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
            parallel: default_parallel(),
            root: None,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct Registration {
    pub graph: OverlapGraph,
    pub frame: GlobalFrame,
}

impl Registration {
    pub fn summary(&self) -> Summary {
        self.frame.summary()
    }
}

/// Runs the full pipeline over a scan set.
///
/// # Example
///
/// ```rust
/// use scanfuse_registration::engine::{Engine, EngineConfig};
/// use scanfuse_types::{Point3, ScannerReport};
///
/// let reports = [ScannerReport::new(0, [Point3::new(1, 2, 3), Point3::new(-4, 5, 6)])];
/// let registration = Engine::new(EngineConfig::default()).run(&reports).unwrap();
/// assert_eq!(registration.summary().beacon_count, 2);
/// assert_eq!(registration.summary().max_manhattan_distance, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[instrument(skip_all, fields(reports = reports.len()))]
    pub fn run(&self, reports: &[ScannerReport]) -> Result<Registration, ScanError> {
        let started = Instant::now();
        let index = index_reports(reports)?;
        let root = self.config.root.unwrap_or_else(|| reports[0].id());
        if !index.contains_key(&root) {
            return Err(ScanError::UnknownScanner(root));
        }

        let fingerprints: Vec<Fingerprint> = if self.config.parallel {
            reports.par_iter().map(Fingerprint::build).collect()
        } else {
            reports.iter().map(Fingerprint::build).collect()
        };

        let detector = OverlapDetector::new(self.config.overlap_threshold, self.config.parallel);
        let graph = detector.detect(&fingerprints);
        let frame = FrameAssembler::new(reports, &fingerprints, &graph)?.assemble(root)?;

        info!(
            root,
            beacons = frame.beacon_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "registration complete"
        );
        Ok(Registration { graph, frame })
    }
}
