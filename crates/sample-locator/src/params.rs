use crate::LocateError;
use serde::{Deserialize, Serialize};

/// Robust homography fitting settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Maximum reprojection error, in target pixels, for a correspondence to
    /// count as an inlier.
    pub reproj_threshold_px: f64,
    /// Hard upper bound on sampled subsets, degenerate draws included.
    pub max_iters: usize,
    /// Desired probability of drawing at least one all-inlier subset; drives
    /// the adaptive iteration count.
    pub confidence: f64,
    /// Minimal inlier support for a model to be accepted.
    pub min_inliers: usize,
    /// Re-estimate the model from all inliers after sampling.
    pub refine: bool,
    /// Seed for subset sampling. Equal seeds give equal fits.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            reproj_threshold_px: 3.0,
            max_iters: 2000,
            confidence: 0.995,
            min_inliers: 4,
            refine: true,
            seed: 0,
        }
    }
}

/// Plausibility checks on the projected sample outline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyParams {
    /// Minimal projected area in square target pixels. Accepted when
    /// `area >= min_area_px`.
    ///
    /// The default suits targets of a few hundred pixels per side; scale it
    /// with target resolution.
    pub min_area_px: f64,
    /// Also reject non-convex and self-intersecting outlines.
    pub reject_non_convex: bool,
}

impl Default for VerifyParams {
    fn default() -> Self {
        Self {
            min_area_px: 1000.0,
            reject_non_convex: false,
        }
    }
}

/// Configuration for [`crate::SampleLocator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    /// Distance-ratio threshold: a match is kept when
    /// `best < ratio * second_best`.
    pub ratio: f32,
    /// Neighbours requested from the matcher; the ratio test needs 2.
    pub k: usize,
    /// Minimal number of ratio-test survivors before fitting.
    pub min_matches: usize,
    pub ransac: RansacParams,
    pub verify: VerifyParams,
    /// Process samples on the rayon pool (feature `rayon`).
    pub parallel: bool,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            ratio: 0.75,
            k: 2,
            min_matches: 4,
            ransac: RansacParams::default(),
            verify: VerifyParams::default(),
            parallel: true,
        }
    }
}

impl LocatorParams {
    /// Check ranges; called by the locator constructors.
    pub fn validate(&self) -> Result<(), LocateError> {
        let invalid = |msg: String| Err(LocateError::InvalidParams(msg));

        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return invalid(format!("ratio must be in (0, 1], got {}", self.ratio));
        }
        if self.k < 2 {
            return invalid(format!("k must be at least 2, got {}", self.k));
        }
        if self.min_matches < 4 {
            return invalid(format!(
                "min_matches must be at least 4, got {}",
                self.min_matches
            ));
        }
        let r = &self.ransac;
        if !(r.reproj_threshold_px.is_finite() && r.reproj_threshold_px > 0.0) {
            return invalid(format!(
                "ransac.reproj_threshold_px must be positive, got {}",
                r.reproj_threshold_px
            ));
        }
        if r.max_iters == 0 {
            return invalid("ransac.max_iters must be non-zero".to_string());
        }
        if !(r.confidence > 0.0 && r.confidence < 1.0) {
            return invalid(format!(
                "ransac.confidence must be in (0, 1), got {}",
                r.confidence
            ));
        }
        if r.min_inliers < 4 {
            return invalid(format!(
                "ransac.min_inliers must be at least 4, got {}",
                r.min_inliers
            ));
        }
        let v = &self.verify;
        if !(v.min_area_px.is_finite() && v.min_area_px >= 0.0) {
            return invalid(format!(
                "verify.min_area_px must be finite and non-negative, got {}",
                v.min_area_px
            ));
        }
        Ok(())
    }
}
