//! Projection of the sample outline into the target and plausibility checks.

use nalgebra::Point2;
use sample_locator_core::{image_corners, is_convex, polygon_area, Homography};

use crate::{SampleRejection, VerifyParams};

/// Sample outline mapped into target pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedQuad {
    /// `(0,0), (W,0), (W,H), (0,H)` of the sample, projected.
    pub corners: [Point2<f32>; 4],
    /// Absolute shoelace area, square pixels.
    pub area: f64,
}

/// Project the four corners of a `width x height` sample through `h`.
pub fn project_quad(
    h: &Homography,
    width: u32,
    height: u32,
) -> Result<ProjectedQuad, SampleRejection> {
    let src = image_corners(width, height);
    let mut corners = [Point2::origin(); 4];
    for (dst, &p) in corners.iter_mut().zip(src.iter()) {
        *dst = h.try_apply(p).ok_or(SampleRejection::NonFiniteProjection)?;
    }
    let area = polygon_area(&corners);
    Ok(ProjectedQuad { corners, area })
}

/// Accept or reject an already projected outline.
pub fn verify_quad(quad: &ProjectedQuad, params: &VerifyParams) -> Result<(), SampleRejection> {
    if quad.area.is_nan() || quad.area < params.min_area_px {
        return Err(SampleRejection::AreaTooSmall {
            area: quad.area,
            min: params.min_area_px,
        });
    }
    if params.reject_non_convex && !is_convex(&quad.corners) {
        return Err(SampleRejection::NonConvex);
    }
    Ok(())
}

/// [`project_quad`] followed by [`verify_quad`].
pub fn verify_projection(
    h: &Homography,
    width: u32,
    height: u32,
    params: &VerifyParams,
) -> Result<ProjectedQuad, SampleRejection> {
    let quad = project_quad(h, width, height)?;
    verify_quad(&quad, params)?;
    Ok(quad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;
    use sample_locator_core::{FeatureSet, Sample};

    #[test]
    fn identity_projection_reproduces_sample_outline() {
        let sample = Sample::new("card", 120, 45, FeatureSet::empty()).unwrap();
        let quad = project_quad(&Homography::identity(), sample.width(), sample.height()).unwrap();
        assert_eq!(quad.corners, sample.corners());
        assert_eq!(quad.area, 5400.0);
    }

    #[test]
    fn area_at_threshold_is_accepted() {
        let params = VerifyParams::default();
        let quad = verify_projection(&Homography::identity(), 40, 25, &params).expect("accept");
        assert_eq!(quad.area, 1000.0);
    }

    #[test]
    fn area_below_threshold_is_rejected() {
        let params = VerifyParams::default();
        let err = verify_projection(&Homography::identity(), 40, 24, &params).unwrap_err();
        assert_eq!(
            err,
            SampleRejection::AreaTooSmall {
                area: 960.0,
                min: 1000.0
            }
        );
    }

    #[test]
    fn scaled_projection_reports_scaled_area() {
        let h = Homography::new(Matrix3::new(
            2.0, 0.0, 15.0, //
            0.0, 3.0, -4.0, //
            0.0, 0.0, 1.0,
        ));
        let quad = project_quad(&h, 10, 10).unwrap();
        assert_eq!(quad.area, 600.0);
        assert_eq!(quad.corners[2], Point2::new(35.0, 26.0));
    }

    #[test]
    fn folded_projection_is_rejected_only_when_enabled() {
        // A mild shear stays convex.
        let h = Homography::new(Matrix3::new(
            1.0, -0.02, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ));
        let quad = ProjectedQuad {
            corners: [
                Point2::new(0.0, 0.0),
                Point2::new(100.0, 0.0),
                Point2::new(0.0, 100.0),
                Point2::new(100.0, 100.0),
            ],
            area: 5000.0,
        };
        let lenient = VerifyParams::default();
        assert!(verify_quad(&quad, &lenient).is_ok());

        let strict = VerifyParams {
            reject_non_convex: true,
            ..VerifyParams::default()
        };
        assert_eq!(verify_quad(&quad, &strict), Err(SampleRejection::NonConvex));
        assert!(verify_projection(&h, 100, 100, &strict).is_ok());
    }

    #[test]
    fn corner_at_infinity_is_rejected() {
        // w = 1 - x / 50 vanishes at x = 50, the right edge of a 50 px sample.
        let h = Homography::new(Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            -0.02, 0.0, 1.0,
        ));
        assert_eq!(
            project_quad(&h, 50, 20),
            Err(SampleRejection::NonFiniteProjection)
        );
    }

    #[test]
    fn nan_area_is_rejected() {
        let quad = ProjectedQuad {
            corners: [Point2::origin(); 4],
            area: f64::NAN,
        };
        assert!(verify_quad(&quad, &VerifyParams::default()).is_err());
    }
}
