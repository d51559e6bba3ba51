//! RANSAC homography fitting over noisy correspondences.

use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sample_locator_core::{
    cross, estimate_homography_dlt, homography_from_4pt, is_collinear, Homography,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{RansacError, RansacParams};

/// Correspondences in a minimal subset.
const MIN_SAMPLE: usize = 4;

const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// A fitted homography together with the support that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct HomographyFit {
    pub homography: Homography,
    /// `inlier_mask[i]` is set when correspondence `i` reprojects within the
    /// threshold.
    pub inlier_mask: Vec<bool>,
    pub inliers: usize,
    /// Subsets drawn, degenerate ones included.
    pub iterations: usize,
}

impl HomographyFit {
    /// Fraction of correspondences that are inliers.
    pub fn inlier_ratio(&self) -> f64 {
        if self.inlier_mask.is_empty() {
            0.0
        } else {
            self.inliers as f64 / self.inlier_mask.len() as f64
        }
    }
}

/// `true` when a minimal subset cannot define a usable homography: three of
/// its points are collinear in either image, or the triangle orientations
/// disagree between the images (a folded mapping).
pub fn is_degenerate_subset(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> bool {
    let mut orientation = 0.0_f64;
    for [i, j, k] in TRIPLES {
        if is_collinear(src[i], src[j], src[k]) || is_collinear(dst[i], dst[j], dst[k]) {
            return true;
        }
        let s = cross(src[i], src[j], src[k]).signum() * cross(dst[i], dst[j], dst[k]).signum();
        if orientation == 0.0 {
            orientation = s;
        } else if s != orientation {
            return true;
        }
    }
    false
}

/// Iterations needed to draw one all-inlier subset with `confidence`, given
/// the observed inlier ratio. Clamped to `max_iters`.
fn adaptive_iterations(inliers: usize, total: usize, confidence: f64, max_iters: usize) -> usize {
    let w = inliers as f64 / total as f64;
    let p_good = w.powi(MIN_SAMPLE as i32);
    if p_good >= 1.0 {
        return 0;
    }
    let den = (1.0 - p_good).ln();
    if den >= 0.0 || !den.is_finite() {
        return max_iters;
    }
    let k = ((1.0 - confidence).ln() / den).ceil();
    if !k.is_finite() || k >= max_iters as f64 {
        max_iters
    } else {
        k.max(0.0) as usize
    }
}

fn score(
    h: &Homography,
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    threshold: f64,
) -> (Vec<bool>, usize) {
    let mask: Vec<bool> = src
        .iter()
        .zip(dst)
        .map(|(&s, &d)| h.reprojection_error(s, d) <= threshold)
        .collect();
    let count = mask.iter().filter(|&&m| m).count();
    (mask, count)
}

/// Fit `dst ~ H * src` robustly.
///
/// Minimal subsets of four correspondences are drawn from a seeded RNG;
/// degenerate subsets are skipped but still consume the iteration budget, so
/// the loop always terminates within `params.max_iters` draws. The model with
/// the largest support wins; it is then optionally re-estimated from all its
/// inliers, keeping the refit only if it loses no support.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, dst, params), fields(n = src.len()))
)]
pub fn fit_homography_ransac(
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    params: &RansacParams,
) -> Result<HomographyFit, RansacError> {
    if src.len() != dst.len() {
        return Err(RansacError::LengthMismatch {
            src: src.len(),
            dst: dst.len(),
        });
    }
    let n = src.len();
    if n < MIN_SAMPLE {
        return Err(RansacError::TooFewPoints {
            needed: MIN_SAMPLE,
            got: n,
        });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let threshold = params.reproj_threshold_px;

    let mut best: Option<(Homography, Vec<bool>, usize)> = None;
    let mut budget = params.max_iters;
    let mut iterations = 0usize;
    let mut degenerate = 0usize;

    while iterations < budget {
        iterations += 1;

        let picked = rand::seq::index::sample(&mut rng, n, MIN_SAMPLE);
        let mut s4 = [Point2::origin(); MIN_SAMPLE];
        let mut d4 = [Point2::origin(); MIN_SAMPLE];
        for (slot, i) in picked.iter().enumerate() {
            s4[slot] = src[i];
            d4[slot] = dst[i];
        }

        if is_degenerate_subset(&s4, &d4) {
            degenerate += 1;
            continue;
        }
        let Some(h) = homography_from_4pt(&s4, &d4) else {
            degenerate += 1;
            continue;
        };

        let (mask, count) = score(&h, src, dst, threshold);
        let best_count = best.as_ref().map_or(0, |b| b.2);
        if count > best_count {
            budget = adaptive_iterations(count, n, params.confidence, params.max_iters);
            best = Some((h, mask, count));
        }
    }

    let Some((h, mask, count)) = best else {
        log::debug!("ransac: all {iterations} subsets degenerate");
        return Err(RansacError::DegenerateSamples { iterations });
    };
    log::debug!(
        "ransac: {count}/{n} inliers after {iterations} iterations ({degenerate} degenerate)"
    );

    if count < params.min_inliers {
        return Err(RansacError::InsufficientInliers {
            needed: params.min_inliers,
            found: count,
        });
    }

    let (homography, inlier_mask, inliers) = if params.refine {
        refine(h, mask, count, src, dst, threshold)
    } else {
        (h, mask, count)
    };

    Ok(HomographyFit {
        homography,
        inlier_mask,
        inliers,
        iterations,
    })
}

fn refine(
    h: Homography,
    mask: Vec<bool>,
    count: usize,
    src: &[Point2<f32>],
    dst: &[Point2<f32>],
    threshold: f64,
) -> (Homography, Vec<bool>, usize) {
    let (in_src, in_dst): (Vec<Point2<f32>>, Vec<Point2<f32>>) = src
        .iter()
        .zip(dst)
        .zip(&mask)
        .filter(|(_, &m)| m)
        .map(|((&s, &d), _)| (s, d))
        .unzip();

    match estimate_homography_dlt(&in_src, &in_dst) {
        Some(refit) => {
            let (refit_mask, refit_count) = score(&refit, src, dst, threshold);
            if refit_count >= count {
                (refit, refit_mask, refit_count)
            } else {
                log::debug!("ransac: refit lost support ({refit_count} < {count}), keeping sample model");
                (h, mask, count)
            }
        }
        None => (h, mask, count),
    }
}
