//! Locate known reference images ("samples") inside a query image ("target").
//!
//! The crate consumes local features produced elsewhere and runs the
//! matching-and-verification pipeline for every sample:
//!
//! 1. k-NN candidate matches from a [`KnnMatcher`] (k = 2),
//! 2. nearest-neighbour distance-ratio filtering ([`ratio_test`]),
//! 3. robust homography fitting ([`fit_homography_ransac`]),
//! 4. projection of the sample extent and plausibility checks ([`verify`]),
//! 5. ordered aggregation into [`LocateResult`] ([`SampleLocator`]).
//!
//! Per-sample failures never abort a run; they are reported as
//! [`SampleRejection`]s in the per-sample [`SampleOutcome`]s.
//!
//! ## Quickstart
//!
//! ```no_run
//! use sample_locator::{io, LocatorParams, SampleLocator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let samples = io::load_catalog("cards")?;
//! let target = io::load_target("target.json")?;
//!
//! let locator = SampleLocator::new(LocatorParams::default())?;
//! let result = locator.locate(&samples, &target)?;
//! for det in &result.detections {
//!     println!("{} at ({:.1}, {:.1})", det.name, det.centroid.x, det.centroid.y);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod extract;
mod filter;
pub mod io;
mod locator;
mod matcher;
mod params;
mod ransac;
pub mod verify;

pub use error::{LocateError, RansacError, RejectionKind, SampleRejection};
pub use extract::{build_samples, extract_sample, FeatureExtractor};
pub use filter::ratio_test;
pub use locator::{LocateResult, SampleLocator, SampleOutcome};
pub use matcher::{BruteForceMatcher, KnnMatcher};
pub use params::{LocatorParams, RansacParams, VerifyParams};
pub use ransac::{fit_homography_ransac, is_degenerate_subset, HomographyFit};
pub use verify::{project_quad, verify_projection, verify_quad, ProjectedQuad};

pub use sample_locator_core as core;
pub use sample_locator_core::{
    CandidateMatch, Descriptor, Detection, FeatureSet, Homography, Keypoint, Match, Neighbor,
    Sample, SampleError,
};
