//! Numeric kernels shared by the narrow phase
//!
//! Every kernel has a scalar reference version. The `simd` feature switches
//! the hot path to a fast reciprocal square root and a lane-wise projection
//! written for auto-vectorization. Both variants are always compiled so they
//! can be checked against each other.

use crate::foundation::math::Vec2;

/// Square root used for normalization on the hot path
#[inline]
pub fn sqrt(x: f32) -> f32 {
    #[cfg(feature = "simd")]
    {
        fast_sqrt(x)
    }
    #[cfg(not(feature = "simd"))]
    {
        x.sqrt()
    }
}

/// Project four points on an axis, returning `(min, max)`
#[inline]
pub fn project4(points: &[Vec2; 4], axis: &Vec2) -> (f32, f32) {
    #[cfg(feature = "simd")]
    {
        project4_lanes(points, axis)
    }
    #[cfg(not(feature = "simd"))]
    {
        project4_scalar(points, axis)
    }
}

/// Reciprocal square root via the bit-level initial guess and two Newton steps
///
/// Relative error stays below 1e-5 for positive normal floats.
#[inline]
pub fn fast_inv_sqrt(x: f32) -> f32 {
    let half = 0.5 * x;
    let mut y = f32::from_bits(0x5f37_59df - (x.to_bits() >> 1));
    y *= 1.5 - half * y * y;
    y *= 1.5 - half * y * y;
    y
}

/// Square root through [`fast_inv_sqrt`]; non-positive input yields 0
#[inline]
pub fn fast_sqrt(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    x * fast_inv_sqrt(x)
}

/// Reference projection
#[inline]
pub fn project4_scalar(points: &[Vec2; 4], axis: &Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for p in points {
        let d = p.x * axis.x + p.y * axis.y;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Projection over structure-of-arrays lanes
#[inline]
pub fn project4_lanes(points: &[Vec2; 4], axis: &Vec2) -> (f32, f32) {
    let xs = [points[0].x, points[1].x, points[2].x, points[3].x];
    let ys = [points[0].y, points[1].y, points[2].y, points[3].y];
    let dots: [f32; 4] = std::array::from_fn(|lane| xs[lane] * axis.x + ys[lane] * axis.y);
    let min = dots[0].min(dots[1]).min(dots[2].min(dots[3]));
    let max = dots[0].max(dots[1]).max(dots[2].max(dots[3]));
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fast_sqrt_matches_scalar() {
        let mut x = 1.0e-4_f32;
        while x < 1.0e8 {
            let exact = x.sqrt();
            assert_relative_eq!(fast_sqrt(x), exact, max_relative = 1.0e-3);
            x *= 1.37;
        }
    }

    #[test]
    fn test_fast_sqrt_non_positive() {
        assert_eq!(fast_sqrt(0.0), 0.0);
        assert_eq!(fast_sqrt(-4.0), 0.0);
    }

    #[test]
    fn test_projection_variants_agree() {
        let points = [
            Vec2::new(-3.5, 2.0),
            Vec2::new(10.25, -7.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(-3.5, 2.0),
        ];
        for axis in [
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.6, 0.8),
            Vec2::new(-0.28, 0.96),
        ] {
            let (smin, smax) = project4_scalar(&points, &axis);
            let (lmin, lmax) = project4_lanes(&points, &axis);
            assert_relative_eq!(smin, lmin);
            assert_relative_eq!(smax, lmax);
        }
    }

    #[test]
    fn test_selected_sqrt_is_accurate() {
        assert_relative_eq!(sqrt(2.0), std::f32::consts::SQRT_2, max_relative = 1.0e-3);
    }
}
