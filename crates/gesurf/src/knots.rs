//! Knot vectors of uniform cubic B-splines with optionally clamped ends.
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Reciprocal knot spacings used by the basis of a single spline span.
///
/// For span `i`, `dAB` is `1 / (knot[i + A - 2] - knot[i + B - 2])` over the full knot vector.
/// Only the first three knots of the span are stored; the rest of the vector is folded into these
/// reciprocals.
#[derive(Debug, Clone, Copy, PartialEq, Immutable, IntoBytes, FromBytes)]
#[repr(C)]
pub struct KnotDivisors {
    pub d30: f32,
    pub d41: f32,
    pub d52: f32,
    pub d31: f32,
    pub d42: f32,
    pub d32: f32,
}

impl Default for KnotDivisors {
    fn default() -> Self {
        Self {
            d30: 1.0 / 3.0,
            d41: 1.0 / 3.0,
            d52: 1.0 / 3.0,
            d31: 1.0 / 2.0,
            d42: 1.0 / 2.0,
            d32: 1.0,
        }
    }
}

/// Whether each end of a spline axis is open, i.e. whether the curve is clamped to pass through
/// the first or last control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Boundary {
    pub start_open: bool,
    pub end_open: bool,
}

impl Boundary {
    pub const CLOSED: Self = Self {
        start_open: false,
        end_open: false,
    };

    pub const OPEN: Self = Self {
        start_open: true,
        end_open: true,
    };

    /// Decodes the two-bit boundary field: bit 0 opens the start, bit 1 opens the end.
    #[inline(always)]
    pub fn from_bits(value: u32) -> Self {
        Self {
            start_open: value & 0b01 != 0,
            end_open: value & 0b10 != 0,
        }
    }

    #[inline(always)]
    pub fn to_bits(self) -> u32 {
        self.start_open as u32 | (self.end_open as u32) << 1
    }
}

/// Number of spans of a spline axis with `count` control points.
#[inline(always)]
pub fn span_count(count: usize) -> usize {
    count.saturating_sub(3)
}

/// Builds the knot vector and divisors of a spline axis with `n` spans. `knots` must hold
/// `n + 2` elements and `divs` must hold `n`.
pub fn build(boundary: Boundary, knots: &mut [f32], divs: &mut [KnotDivisors]) {
    let n = divs.len();
    debug_assert!(n >= 1);
    debug_assert_eq!(knots.len(), n + 2);

    for (i, knot) in knots.iter_mut().enumerate() {
        *knot = i as f32 - 2.0;
    }

    divs.fill(KnotDivisors::default());

    if boundary.start_open {
        knots[0] = 0.0;
        knots[1] = 0.0;

        divs[0].d30 = 1.0;
        divs[0].d41 = 1.0 / 2.0;
        divs[0].d31 = 1.0;
        if n > 1 {
            divs[1].d30 = 1.0 / 2.0;
        }
    }

    if boundary.end_open {
        divs[n - 1].d41 = 1.0 / 2.0;
        divs[n - 1].d52 = 1.0;
        divs[n - 1].d42 = 1.0;
        if n > 1 {
            divs[n - 2].d52 = 1.0 / 2.0;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn knots_of(n: usize, boundary: Boundary) -> (Vec<f32>, Vec<KnotDivisors>) {
        let mut knots = vec![0.0; n + 2];
        let mut divs = vec![KnotDivisors::default(); n];
        build(boundary, &mut knots, &mut divs);
        (knots, divs)
    }

    #[test]
    fn closed_is_uniform() {
        let (knots, divs) = knots_of(3, Boundary::CLOSED);
        assert_eq!(knots, [-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert!(divs.iter().all(|d| *d == KnotDivisors::default()));
    }

    #[test]
    fn open_start() {
        let (knots, divs) = knots_of(3, Boundary::from_bits(0b01));
        assert_eq!(knots, [0.0, 0.0, 0.0, 1.0, 2.0]);
        assert_eq!(divs[0].d30, 1.0);
        assert_eq!(divs[0].d41, 0.5);
        assert_eq!(divs[0].d31, 1.0);
        assert_eq!(divs[1].d30, 0.5);
        assert_eq!(divs[2], KnotDivisors::default());
    }

    #[test]
    fn open_end() {
        let (knots, divs) = knots_of(3, Boundary::from_bits(0b10));
        assert_eq!(knots, [-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(divs[0], KnotDivisors::default());
        assert_eq!(divs[1].d52, 0.5);
        assert_eq!(divs[2].d41, 0.5);
        assert_eq!(divs[2].d52, 1.0);
        assert_eq!(divs[2].d42, 1.0);
    }

    #[test]
    fn single_span_open_both() {
        let (knots, divs) = knots_of(1, Boundary::OPEN);
        assert_eq!(knots, [0.0, 0.0, 0.0]);
        assert_eq!(divs[0].d30, 1.0);
        assert_eq!(divs[0].d41, 0.5);
        assert_eq!(divs[0].d52, 1.0);
        assert_eq!(divs[0].d31, 1.0);
        assert_eq!(divs[0].d42, 1.0);
    }

    #[test]
    fn boundary_bits() {
        assert_eq!(Boundary::from_bits(0b11), Boundary::OPEN);
        assert_eq!(Boundary::OPEN.to_bits(), 0b11);
        assert_eq!(Boundary::from_bits(0b10).to_bits(), 0b10);
    }
}
