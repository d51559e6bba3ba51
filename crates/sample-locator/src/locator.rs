//! Per-sample pipeline and ordered aggregation.

use log::{debug, info, warn};
use nalgebra::Point2;
use sample_locator_core::{centroid, Detection, FeatureSet, Sample};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    fit_homography_ransac, project_quad, ratio_test, verify_quad, BruteForceMatcher, KnnMatcher,
    LocateError, LocatorParams, SampleRejection,
};

/// Diagnostics for one sample, detected or not.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleOutcome {
    pub name: String,
    /// k-NN lists returned by the matcher.
    pub candidate_matches: usize,
    /// Ratio-test survivors.
    pub good_matches: usize,
    /// RANSAC support, when a model was fitted.
    pub inliers: Option<usize>,
    /// Projected area, when the outline could be projected.
    pub area: Option<f64>,
    /// Why the sample was excluded; `None` for detections.
    pub rejection: Option<SampleRejection>,
}

impl SampleOutcome {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            candidate_matches: 0,
            good_matches: 0,
            inliers: None,
            area: None,
            rejection: None,
        }
    }

    #[inline]
    pub fn is_detected(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Result of one run over a sample catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocateResult {
    /// Accepted detections, in sample order.
    pub detections: Vec<Detection>,
    /// One entry per input sample, in sample order.
    pub outcomes: Vec<SampleOutcome>,
    /// `true` iff at least one sample was detected.
    pub any_found: bool,
}

impl LocateResult {
    /// Detection for the sample named `name`, if it was located.
    pub fn detection(&self, name: &str) -> Option<&Detection> {
        self.detections.iter().find(|d| d.name == name)
    }

    /// Fold one per-sample result into the aggregate. Order of calls is the
    /// order of the output.
    fn push(&mut self, detection: Option<Detection>, outcome: SampleOutcome) {
        if let Some(det) = detection {
            self.any_found = true;
            self.detections.push(det);
        }
        self.outcomes.push(outcome);
    }
}

/// Locates every sample of a catalog in a target feature set.
pub struct SampleLocator<M: KnnMatcher = BruteForceMatcher> {
    params: LocatorParams,
    matcher: M,
}

impl SampleLocator<BruteForceMatcher> {
    /// Locator with the exhaustive Euclidean matcher.
    pub fn new(params: LocatorParams) -> Result<Self, LocateError> {
        Self::with_matcher(params, BruteForceMatcher)
    }
}

impl<M: KnnMatcher> SampleLocator<M> {
    pub fn with_matcher(params: LocatorParams, matcher: M) -> Result<Self, LocateError> {
        params.validate()?;
        Ok(Self { params, matcher })
    }

    #[inline]
    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    #[inline]
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Run the pipeline for every sample against `target`.
    ///
    /// Samples are independent and may be processed in parallel; detections
    /// and outcomes are always reported in input order. Per-sample failures
    /// are recorded in the outcomes and never abort the run.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(samples = samples.len(), target = target.len()))
    )]
    pub fn locate(
        &self,
        samples: &[Sample],
        target: &FeatureSet,
    ) -> Result<LocateResult, LocateError> {
        if samples.is_empty() {
            return Err(LocateError::NoSamples);
        }
        if target.is_empty() {
            warn!("target has no descriptors");
        }

        let per_sample = self.map_samples(samples, target);

        let mut result = LocateResult::default();
        for (detection, outcome) in per_sample {
            result.push(detection, outcome);
        }

        if result.any_found {
            info!(
                "located {}/{} samples",
                result.detections.len(),
                samples.len()
            );
        } else {
            warn!("no matches found for any sample");
        }
        Ok(result)
    }

    #[cfg(feature = "rayon")]
    fn map_samples(
        &self,
        samples: &[Sample],
        target: &FeatureSet,
    ) -> Vec<(Option<Detection>, SampleOutcome)> {
        if self.params.parallel {
            samples
                .par_iter()
                .map(|s| self.locate_sample_with_outcome(s, target))
                .collect()
        } else {
            self.map_sequential(samples, target)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn map_samples(
        &self,
        samples: &[Sample],
        target: &FeatureSet,
    ) -> Vec<(Option<Detection>, SampleOutcome)> {
        self.map_sequential(samples, target)
    }

    fn map_sequential(
        &self,
        samples: &[Sample],
        target: &FeatureSet,
    ) -> Vec<(Option<Detection>, SampleOutcome)> {
        samples
            .iter()
            .map(|s| self.locate_sample_with_outcome(s, target))
            .collect()
    }

    /// Locate a single sample; the error explains a rejection.
    pub fn locate_sample(
        &self,
        sample: &Sample,
        target: &FeatureSet,
    ) -> Result<Detection, SampleRejection> {
        let mut outcome = SampleOutcome::new(sample.name());
        self.run(sample, target, &mut outcome)
    }

    fn locate_sample_with_outcome(
        &self,
        sample: &Sample,
        target: &FeatureSet,
    ) -> (Option<Detection>, SampleOutcome) {
        let mut outcome = SampleOutcome::new(sample.name());
        match self.run(sample, target, &mut outcome) {
            Ok(det) => (Some(det), outcome),
            Err(rejection) => {
                info!("sample {}: {rejection}", sample.name());
                outcome.rejection = Some(rejection);
                (None, outcome)
            }
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(sample = sample.name()))
    )]
    fn run(
        &self,
        sample: &Sample,
        target: &FeatureSet,
        outcome: &mut SampleOutcome,
    ) -> Result<Detection, SampleRejection> {
        let name = sample.name();
        if sample.descriptors().is_empty() || target.is_empty() {
            return Err(SampleRejection::EmptyDescriptors);
        }
        let sample_len = sample.features().descriptor_len();
        let target_len = target.descriptor_len();
        if sample_len != target_len {
            return Err(SampleRejection::DescriptorWidthMismatch {
                sample: sample_len,
                target: target_len,
            });
        }

        let candidates =
            self.matcher
                .knn_match(sample.descriptors(), target.descriptors(), self.params.k);
        outcome.candidate_matches = candidates.len();
        debug!("sample {name}: initial matches {}", candidates.len());

        let good = ratio_test(&candidates, self.params.ratio);
        outcome.good_matches = good.len();
        debug!("sample {name}: good matches {}", good.len());

        if good.len() < self.params.min_matches {
            return Err(SampleRejection::TooFewMatches {
                found: good.len(),
                needed: self.params.min_matches,
            });
        }

        let sample_kps = sample.keypoints();
        let target_kps = target.keypoints();
        let mut src: Vec<Point2<f32>> = Vec::with_capacity(good.len());
        let mut dst: Vec<Point2<f32>> = Vec::with_capacity(good.len());
        for m in &good {
            let (Some(s), Some(t)) = (sample_kps.get(m.query_idx), target_kps.get(m.train_idx))
            else {
                return Err(SampleRejection::MatchIndexOutOfRange {
                    query_idx: m.query_idx,
                    train_idx: m.train_idx,
                });
            };
            src.push(s.position);
            dst.push(t.position);
        }

        let fit = fit_homography_ransac(&src, &dst, &self.params.ransac)?;
        outcome.inliers = Some(fit.inliers);

        let quad = project_quad(&fit.homography, sample.width(), sample.height())?;
        outcome.area = Some(quad.area);
        debug!("sample {name}: area {:.1}", quad.area);

        verify_quad(&quad, &self.params.verify)?;

        Ok(Detection {
            name: name.to_string(),
            corners: quad.corners,
            area: quad.area,
            centroid: centroid(&quad.corners),
            homography: fit.homography,
            good_matches: good.len(),
            inliers: fit.inliers,
        })
    }
}
