//! `scanfuse-registration` – scanner registration and global-frame assembly.
//!
//! Takes several scanners' beacon reports, each in its own unknown frame,
//! works out which scanners see the same beacons and merges everything into
//! the frame of one root scanner.
//!
//! # Modules
//!
//! - [`rotation`] – [`Rotation`][rotation::Rotation]: the 24 axis-aligned
//!   rotations, with composition and inversion.
//! - [`transform`] – [`Transform`][transform::Transform]: rotation plus
//!   integer translation relating two scanner frames.
//! - [`fingerprint`] – [`Fingerprint`][fingerprint::Fingerprint]: per-scanner
//!   index of beacon pairs by squared distance.
//! - [`overlap`] – [`OverlapDetector`][overlap::OverlapDetector]: compares
//!   fingerprints pairwise (in parallel) and builds the
//!   [`OverlapGraph`][overlap::OverlapGraph].
//! - [`resolver`] – [`resolve`][resolver::resolve]: finds the unique
//!   rotation and translation behind one overlap edge.
//! - [`assembler`] – [`FrameAssembler`][assembler::FrameAssembler]:
//!   breadth-first placement of every scanner relative to the root.
//! - [`query`] – beacon count, scanner spread and relative transforms over
//!   the assembled [`GlobalFrame`][assembler::GlobalFrame].
//! - [`engine`] – [`Engine`][engine::Engine]: the whole pipeline behind one
//!   call, driven by [`EngineConfig`][engine::EngineConfig].

pub mod assembler;
pub mod engine;
pub mod fingerprint;
pub mod overlap;
pub mod query;
pub mod resolver;
pub mod rotation;
pub mod transform;

#[cfg(test)]
mod fixtures;

pub use assembler::{FrameAssembler, GlobalFrame, ScannerPlacement};
pub use engine::{Engine, EngineConfig, Registration};
pub use overlap::{OVERLAP_THRESHOLD, OverlapDetector, OverlapGraph};
pub use query::Summary;
pub use rotation::Rotation;
pub use transform::Transform;
