//! Feature extraction seam.

use log::{info, warn};
use sample_locator_core::{FeatureSet, Sample, SampleError};

/// Produces keypoints and descriptors from a decoded image.
///
/// Extraction never fails; an image that cannot be processed yields an
/// empty [`FeatureSet`], and the locator later skips samples without
/// descriptors.
pub trait FeatureExtractor {
    type Image: ?Sized;

    /// Pixel `(width, height)` of `image`.
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    fn extract(&self, image: &Self::Image) -> FeatureSet;
}

/// Extract features once and wrap them into a named [`Sample`].
pub fn extract_sample<E: FeatureExtractor>(
    extractor: &E,
    name: impl Into<String>,
    image: &E::Image,
) -> Result<Sample, SampleError> {
    let (width, height) = extractor.dimensions(image);
    let features = extractor.extract(image);
    Sample::new(name, width, height, features)
}

/// Build samples from named images, skipping (and logging) those whose
/// extent is unusable. Order follows the input.
pub fn build_samples<'a, E, I>(extractor: &E, images: I) -> Vec<Sample>
where
    E: FeatureExtractor,
    E::Image: 'a,
    I: IntoIterator<Item = (String, &'a E::Image)>,
{
    images
        .into_iter()
        .filter_map(|(name, image)| match extract_sample(extractor, name.clone(), image) {
            Ok(sample) => {
                info!(
                    "parsed sample {} (keypoints: {})",
                    sample.name(),
                    sample.keypoints().len()
                );
                Some(sample)
            }
            Err(err) => {
                warn!("failed to parse sample {name}: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_locator_core::{Descriptor, Keypoint};

    struct Synthetic;

    struct Picture {
        width: u32,
        height: u32,
        blobs: Vec<(f32, f32)>,
    }

    impl FeatureExtractor for Synthetic {
        type Image = Picture;

        fn dimensions(&self, image: &Picture) -> (u32, u32) {
            (image.width, image.height)
        }

        fn extract(&self, image: &Picture) -> FeatureSet {
            let kps = image.blobs.iter().map(|&(x, y)| Keypoint::at(x, y)).collect();
            let desc = image
                .blobs
                .iter()
                .map(|&(x, y)| Descriptor::new(vec![x, y]))
                .collect();
            FeatureSet::new(kps, desc).unwrap_or_default()
        }
    }

    #[test]
    fn builds_samples_in_order_and_skips_invalid_extent() {
        let a = Picture {
            width: 10,
            height: 10,
            blobs: vec![(1.0, 1.0), (2.0, 3.0)],
        };
        let broken = Picture {
            width: 0,
            height: 10,
            blobs: vec![],
        };
        let c = Picture {
            width: 5,
            height: 8,
            blobs: vec![],
        };
        let samples = build_samples(
            &Synthetic,
            vec![
                ("a".to_string(), &a),
                ("broken".to_string(), &broken),
                ("c".to_string(), &c),
            ],
        );
        let names: Vec<_> = samples.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(samples[0].keypoints().len(), 2);
        assert!(samples[1].descriptors().is_empty());
    }
}
