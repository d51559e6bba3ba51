use crate::Homography;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One sample located in the target image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Sample name.
    pub name: String,
    /// Projected sample corners in target pixels, in the order
    /// `(0,0), (W,0), (W,H), (0,H)` of the sample image.
    pub corners: [Point2<f32>; 4],
    /// Absolute area of the projected quadrilateral, square pixels.
    pub area: f64,
    /// Mean of the four corners; the anchor for the sample's label.
    pub centroid: Point2<f32>,
    /// Sample-to-target transform the corners were projected with.
    pub homography: Homography,
    /// Correspondences that survived the ratio test.
    pub good_matches: usize,
    /// Correspondences consistent with `homography`.
    pub inliers: usize,
}

impl Detection {
    /// Top-left origin for a `text_w x text_h` label centered on the centroid.
    pub fn label_origin(&self, text_w: f32, text_h: f32) -> Point2<f32> {
        Point2::new(
            self.centroid.x - text_w / 2.0,
            self.centroid.y - text_h / 2.0,
        )
    }

    /// Closed polyline through the corners, suitable for outline drawing.
    pub fn outline(&self) -> impl Iterator<Item = (Point2<f32>, Point2<f32>)> + '_ {
        (0..4).map(move |i| (self.corners[i], self.corners[(i + 1) % 4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection() -> Detection {
        Detection {
            name: "ace".to_string(),
            corners: [
                Point2::new(10.0, 10.0),
                Point2::new(110.0, 10.0),
                Point2::new(110.0, 60.0),
                Point2::new(10.0, 60.0),
            ],
            area: 5000.0,
            centroid: Point2::new(60.0, 35.0),
            homography: Homography::identity(),
            good_matches: 12,
            inliers: 10,
        }
    }

    #[test]
    fn label_is_centered_on_centroid() {
        let origin = detection().label_origin(20.0, 10.0);
        assert_eq!(origin, Point2::new(50.0, 30.0));
    }

    #[test]
    fn outline_closes_the_quad() {
        let d = detection();
        let edges: Vec<_> = d.outline().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (d.corners[3], d.corners[0]));
    }
}
