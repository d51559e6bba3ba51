//! Core types and geometry for locating reference samples in a target image.
//!
//! The crate is purely geometric. It does not produce keypoints, search for
//! candidate matches or present results; it defines the data those
//! collaborators exchange and the projective geometry the pipeline needs.

mod detection;
mod features;
mod geometry;
mod homography;
mod logger;
mod matches;

pub use detection::Detection;
pub use features::{Descriptor, FeatureSet, Keypoint, Sample, SampleError};
pub use geometry::{
    centroid, cross, image_corners, is_collinear, is_convex, polygon_area, signed_area,
    COLLINEAR_SIN_TOL,
};
pub use homography::{estimate_homography_dlt, homography_from_4pt, Homography};
pub use matches::{CandidateMatch, Match, Neighbor};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{default_directive, init_from_name, init_with_level, parse_level, LoggerError};
