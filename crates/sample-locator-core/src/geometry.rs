//! Small planar-polygon helpers.

use nalgebra::Point2;

/// Z component of `(a - o) x (b - o)`; positive for a counter-clockwise turn
/// in a y-up frame (clockwise on screen).
#[inline]
pub fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let (ox, oy) = (o.x as f64, o.y as f64);
    let (dx1, dy1) = (a.x as f64 - ox, a.y as f64 - oy);
    let (dx2, dy2) = (b.x as f64 - ox, b.y as f64 - oy);
    dx1 * dy2 - dy1 * dx2
}

/// Largest `|sin|` of the angle at `a` for which a triple still counts as
/// collinear.
pub const COLLINEAR_SIN_TOL: f64 = 1e-4;

/// `true` when the three points are coincident or lie on one line, i.e. the
/// angle between `b - a` and `c - a` has `|sin| <= COLLINEAR_SIN_TOL`.
pub fn is_collinear(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> bool {
    let (dx1, dy1) = (b.x as f64 - a.x as f64, b.y as f64 - a.y as f64);
    let (dx2, dy2) = (c.x as f64 - a.x as f64, c.y as f64 - a.y as f64);
    let n1 = dx1.hypot(dy1);
    let n2 = dx2.hypot(dy2);
    (dx1 * dy2 - dy1 * dx2).abs() <= COLLINEAR_SIN_TOL * n1 * n2
}

/// Corners of a `width x height` image, clockwise on screen from the origin:
/// `(0,0), (W,0), (W,H), (0,H)`.
pub fn image_corners(width: u32, height: u32) -> [Point2<f32>; 4] {
    let w = width as f32;
    let h = height as f32;
    [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

/// Shoelace area; the sign follows vertex winding.
pub fn signed_area(poly: &[Point2<f32>]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0_f64;
    for (i, p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        acc += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    0.5 * acc
}

/// Absolute polygon area.
#[inline]
pub fn polygon_area(poly: &[Point2<f32>]) -> f64 {
    signed_area(poly).abs()
}

/// Vertex mean. Returns the origin for an empty slice.
pub fn centroid(points: &[Point2<f32>]) -> Point2<f32> {
    if points.is_empty() {
        return Point2::origin();
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0_f64, 0.0_f64), |(sx, sy), p| {
        (sx + p.x as f64, sy + p.y as f64)
    });
    Point2::new((sx / n) as f32, (sy / n) as f32)
}

/// Strict convexity test: every turn has the same non-zero sign.
///
/// For quadrilaterals this also rejects self-intersecting ("bow-tie")
/// vertex orders.
pub fn is_convex(poly: &[Point2<f32>]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0_f64;
    for i in 0..n {
        let z = cross(poly[i], poly[(i + 1) % n], poly[(i + 2) % n]);
        if z == 0.0 || !z.is_finite() {
            return false;
        }
        if sign == 0.0 {
            sign = z.signum();
        } else if z.signum() != sign {
            return false;
        }
    }
    true
}
