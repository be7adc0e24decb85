//! Basis functions of cubic Bezier curves and uniform cubic B-splines.
use std::ops::{Add, Mul};

use crate::knots::KnotDivisors;

/// A value that can be blended by a basis: positions, colors, texture coordinates...
pub trait Weighted: Copy + Add<Output = Self> + Mul<f32, Output = Self> {}

impl<T> Weighted for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> {}

#[inline(always)]
pub fn bern0(x: f32) -> f32 {
    let nx = 1.0 - x;
    nx * nx * nx
}

#[inline(always)]
pub fn bern1(x: f32) -> f32 {
    let nx = 1.0 - x;
    3.0 * nx * nx * x
}

#[inline(always)]
pub fn bern2(x: f32) -> f32 {
    3.0 * (1.0 - x) * x * x
}

#[inline(always)]
pub fn bern3(x: f32) -> f32 {
    x * x * x
}

#[inline(always)]
pub fn bern0_deriv(x: f32) -> f32 {
    let nx = 1.0 - x;
    -3.0 * nx * nx
}

#[inline(always)]
pub fn bern1_deriv(x: f32) -> f32 {
    9.0 * x * x - 12.0 * x + 3.0
}

#[inline(always)]
pub fn bern2_deriv(x: f32) -> f32 {
    3.0 * (2.0 - 3.0 * x) * x
}

#[inline(always)]
pub fn bern3_deriv(x: f32) -> f32 {
    3.0 * x * x
}

/// Evaluates a cubic Bezier curve at `x`. The endpoints are returned exactly at `x == 0.0` and
/// `x == 1.0`.
#[inline(always)]
#[expect(clippy::float_cmp, reason = "endpoints are exact")]
pub fn bernstein<T: Weighted>(p0: T, p1: T, p2: T, p3: T, x: f32) -> T {
    if x == 0.0 {
        return p0;
    }

    if x == 1.0 {
        return p3;
    }

    p0 * bern0(x) + p1 * bern1(x) + p2 * bern2(x) + p3 * bern3(x)
}

/// Evaluates the derivative of a cubic Bezier curve at `x`.
#[inline(always)]
pub fn bernstein_derivative<T: Weighted>(p0: T, p1: T, p2: T, p3: T, x: f32) -> T {
    p0 * bern0_deriv(x) + p1 * bern1_deriv(x) + p2 * bern2_deriv(x) + p3 * bern3_deriv(x)
}

/// Weights and derivatives of the four control points influencing a spline span.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SplineBasis {
    pub weights: [f32; 4],
    pub derivatives: [f32; 4],
}

/// Evaluates the basis of span `i` at parameter `t`.
///
/// `knots` is the knot vector built by [`crate::knots::build`] and `div` the divisors of span `i`.
#[inline(always)]
pub fn spline_n_4(i: usize, t: f32, knots: &[f32], div: &KnotDivisors) -> SplineBasis {
    let t0 = t - knots[i];
    let t1 = t - knots[i + 1];
    let t2 = t - knots[i + 2];

    let f30 = t0 * div.d30;
    let f41 = t1 * div.d41;
    let f52 = t2 * div.d52;
    let f31 = t1 * div.d31;
    let f42 = t2 * div.d42;
    let f32 = t2 * div.d32;

    let a = (1.0 - f30) * (1.0 - f31);
    let b = f31 * f41;
    let c = (1.0 - f41) * (1.0 - f42);
    let d = f42 * f52;

    let weights = [
        a - a * f32,
        1.0 - a - b + (a + b + c - 1.0) * f32,
        b + (1.0 - b - c - d) * f32,
        d * f32,
    ];

    let i1 = (1.0 - f31) * (1.0 - f32);
    let i2 = f31 * (1.0 - f32) + (1.0 - f42) * f32;
    let i3 = f42 * f32;

    let f130 = i1 * div.d30;
    let f241 = i2 * div.d41;
    let f352 = i3 * div.d52;

    let derivatives = [
        3.0 * -f130,
        3.0 * (f130 - f241),
        3.0 * (f241 - f352),
        3.0 * f352,
    ];

    SplineBasis {
        weights,
        derivatives,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::knots::{self, Boundary};
    use glam::{Vec2, Vec3};

    const EPSILON: f32 = 1e-5;

    fn spline_knots(n: usize, boundary: Boundary) -> (Vec<f32>, Vec<KnotDivisors>) {
        let mut knots = vec![0.0; n + 2];
        let mut divs = vec![KnotDivisors::default(); n];
        knots::build(boundary, &mut knots, &mut divs);
        (knots, divs)
    }

    #[test]
    fn bernstein_endpoints_are_exact() {
        let p = [
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::ONE,
            Vec3::splat(2.0),
            Vec3::new(7.7, 8.8, 9.9),
        ];

        assert_eq!(bernstein(p[0], p[1], p[2], p[3], 0.0), p[0]);
        assert_eq!(bernstein(p[0], p[1], p[2], p[3], 1.0), p[3]);
    }

    #[test]
    fn bernstein_of_line_is_linear() {
        let p0 = Vec2::ZERO;
        let p3 = Vec2::new(3.0, 6.0);
        let p1 = p3 / 3.0;
        let p2 = p3 * 2.0 / 3.0;

        for i in 0..=8 {
            let t = i as f32 / 8.0;
            let value = bernstein(p0, p1, p2, p3, t);
            assert!((value - p3 * t).length() < EPSILON);

            let derivative = bernstein_derivative(p0, p1, p2, p3, t);
            assert!((derivative - p3).length() < EPSILON);
        }
    }

    #[test]
    fn bernstein_weights_sum_to_one() {
        for i in 0..=16 {
            let x = i as f32 / 16.0;
            let sum = bern0(x) + bern1(x) + bern2(x) + bern3(x);
            assert!((sum - 1.0).abs() < EPSILON);

            let deriv = bern0_deriv(x) + bern1_deriv(x) + bern2_deriv(x) + bern3_deriv(x);
            assert!(deriv.abs() < EPSILON);
        }
    }

    #[test]
    fn spline_partition_of_unity() {
        for bits in 0..4 {
            let n = 4;
            let (knots, divs) = spline_knots(n, Boundary::from_bits(bits));
            for span in 0..n {
                for step in 0..=10 {
                    let t = span as f32 + step as f32 / 10.0;
                    let basis = spline_n_4(span, t, &knots, &divs[span]);
                    let sum: f32 = basis.weights.iter().sum();
                    assert!((sum - 1.0).abs() < EPSILON, "span {span} t {t}: {sum}");
                }
            }
        }
    }

    #[test]
    fn uniform_spline_weights() {
        let (knots, divs) = spline_knots(3, Boundary::CLOSED);
        let basis = spline_n_4(1, 1.0, &knots, &divs[1]);
        let expected = [1.0 / 6.0, 4.0 / 6.0, 1.0 / 6.0, 0.0];
        for (weight, expected) in basis.weights.iter().zip(expected) {
            assert!((weight - expected).abs() < EPSILON);
        }

        let expected = [-0.5, 0.0, 0.5, 0.0];
        for (deriv, expected) in basis.derivatives.iter().zip(expected) {
            assert!((deriv - expected).abs() < EPSILON);
        }
    }

    #[test]
    fn open_ends_interpolate_control_points() {
        let n = 3;
        let (knots, divs) = spline_knots(n, Boundary::OPEN);

        let start = spline_n_4(0, 0.0, &knots, &divs[0]);
        assert_eq!(start.weights, [1.0, 0.0, 0.0, 0.0]);

        let end = spline_n_4(n - 1, n as f32, &knots, &divs[n - 1]);
        for (weight, expected) in end.weights.iter().zip([0.0, 0.0, 0.0, 1.0]) {
            assert!((weight - expected).abs() < EPSILON);
        }
    }
}
