use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::image_corners;

/// A salient image location produced by a feature extractor.
///
/// Only `position` is consumed by the matching pipeline; the remaining
/// fields are detector metadata carried through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Location in pixel coordinates of the image it was extracted from.
    pub position: Point2<f32>,
    /// Diameter of the meaningful neighbourhood, in pixels.
    #[serde(default)]
    pub size: f32,
    /// Dominant orientation in degrees, `-1.0` when not computed.
    #[serde(default = "default_angle")]
    pub angle: f32,
    /// Detector response.
    #[serde(default)]
    pub response: f32,
    /// Pyramid octave the keypoint was found in.
    #[serde(default)]
    pub octave: i32,
}

fn default_angle() -> f32 {
    -1.0
}

impl Keypoint {
    /// Keypoint with only a position; metadata left at neutral values.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            size: 0.0,
            angle: default_angle(),
            response: 0.0,
            octave: 0,
        }
    }
}

/// Fixed-length appearance vector attached to one keypoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(pub Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Squared Euclidean distance. Descriptors of different length are
    /// compared over their common prefix.
    #[inline]
    pub fn distance_l2_squared(&self, other: &Descriptor) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }

    /// Euclidean distance (`NORM_L2`).
    #[inline]
    pub fn distance_l2(&self, other: &Descriptor) -> f32 {
        self.distance_l2_squared(other).sqrt()
    }
}

/// Errors raised when a feature set or sample violates its invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("keypoint/descriptor count mismatch ({keypoints} keypoints, {descriptors} descriptors)")]
    LengthMismatch { keypoints: usize, descriptors: usize },
    #[error("descriptor {index} has length {got}, expected {expected}")]
    DescriptorWidth {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("invalid sample dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Keypoints and their descriptors, index-aligned.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    /// Build a feature set, checking that every keypoint has exactly one
    /// descriptor and all descriptors share the same length.
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> Result<Self, SampleError> {
        if keypoints.len() != descriptors.len() {
            return Err(SampleError::LengthMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        if let Some(first) = descriptors.first() {
            let expected = first.len();
            if let Some((index, d)) = descriptors
                .iter()
                .enumerate()
                .find(|(_, d)| d.len() != expected)
            {
                return Err(SampleError::DescriptorWidth {
                    index,
                    expected,
                    got: d.len(),
                });
            }
        }
        Ok(Self {
            keypoints,
            descriptors,
        })
    }

    /// Feature set with nothing in it; what an extractor returns when it
    /// cannot process an image.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    #[inline]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Descriptor length, `0` for an empty set.
    pub fn descriptor_len(&self) -> usize {
        self.descriptors.first().map_or(0, Descriptor::len)
    }

    pub fn into_parts(self) -> (Vec<Keypoint>, Vec<Descriptor>) {
        (self.keypoints, self.descriptors)
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            keypoints: Vec<Keypoint>,
            #[serde(default)]
            descriptors: Vec<Descriptor>,
        }
        let raw = Raw::deserialize(deserializer)?;
        FeatureSet::new(raw.keypoints, raw.descriptors).map_err(serde::de::Error::custom)
    }
}

/// A named reference image reduced to its extent and local features.
///
/// Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    name: String,
    width: u32,
    height: u32,
    features: FeatureSet,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        features: FeatureSet,
    ) -> Result<Self, SampleError> {
        if width == 0 || height == 0 {
            return Err(SampleError::InvalidDimensions { width, height });
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            features,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    #[inline]
    pub fn keypoints(&self) -> &[Keypoint] {
        self.features.keypoints()
    }

    #[inline]
    pub fn descriptors(&self) -> &[Descriptor] {
        self.features.descriptors()
    }

    /// Image corners in sample pixel space, clockwise from the origin:
    /// `(0,0), (W,0), (W,H), (0,H)`.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        image_corners(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_count_mismatch() {
        let err = FeatureSet::new(vec![Keypoint::at(0.0, 0.0)], Vec::new()).unwrap_err();
        assert_eq!(
            err,
            SampleError::LengthMismatch {
                keypoints: 1,
                descriptors: 0
            }
        );
    }

    #[test]
    fn rejects_ragged_descriptors() {
        let err = FeatureSet::new(
            vec![Keypoint::at(0.0, 0.0), Keypoint::at(1.0, 1.0)],
            vec![Descriptor::new(vec![0.0; 4]), Descriptor::new(vec![0.0; 3])],
        )
        .unwrap_err();
        assert!(matches!(err, SampleError::DescriptorWidth { index: 1, .. }));
    }

    #[test]
    fn l2_distance_is_euclidean() {
        let a = Descriptor::new(vec![0.0, 0.0]);
        let b = Descriptor::new(vec![3.0, 4.0]);
        assert_eq!(a.distance_l2(&b), 5.0);
    }

    #[test]
    fn sample_corners_follow_image_extent() {
        let sample = Sample::new("card", 200, 100, FeatureSet::empty()).unwrap();
        let c = sample.corners();
        assert_eq!(c[2], Point2::new(200.0, 100.0));
        assert_eq!(c[3], Point2::new(0.0, 100.0));
    }

    #[test]
    fn zero_sized_sample_is_invalid() {
        assert!(Sample::new("empty", 0, 10, FeatureSet::empty()).is_err());
    }

    #[test]
    fn feature_set_deserialization_validates() {
        let bad = r#"{"keypoints":[{"position":[1.0,2.0]}],"descriptors":[]}"#;
        assert!(serde_json::from_str::<FeatureSet>(bad).is_err());

        let good = r#"{"keypoints":[{"position":[1.0,2.0]}],"descriptors":[[0.5,0.25]]}"#;
        let set: FeatureSet = serde_json::from_str(good).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.descriptor_len(), 2);
        assert_eq!(set.keypoints()[0].angle, -1.0);
    }
}
