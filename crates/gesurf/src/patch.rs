//! Patch geometry.
//!
//! Patches do not own control points: they refer to them through indices into the array of
//! decoded control points of the current submission.
use crate::{knots::Boundary, vertex::PatchPrimitive};

/// Properties shared by every patch of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchFlags {
    pub primitive: PatchPrimitive,
    /// Whether normals should be derived from the surface.
    pub compute_normals: bool,
    /// Whether derived normals should be flipped.
    pub patch_facing: bool,
}

/// A spline surface. The whole control grid forms a single patch.
#[derive(Debug, Clone, Copy)]
pub struct SplinePatch<'a> {
    /// Control point indices, row-major, `count_u * count_v` of them.
    pub points: &'a [u32],
    pub count_u: usize,
    pub count_v: usize,
    pub tess_u: usize,
    pub tess_v: usize,
    pub boundary_u: Boundary,
    pub boundary_v: Boundary,
    pub flags: PatchFlags,
}

impl SplinePatch<'_> {
    /// Control point index at grid position `(u, v)`.
    #[inline(always)]
    pub fn point(&self, u: usize, v: usize) -> usize {
        self.points[v * self.count_u + u] as usize
    }
}

/// A single 4x4 window of a Bezier control grid.
#[derive(Debug, Clone, Copy)]
pub struct BezierPatch {
    /// Control point indices, row-major.
    pub points: [u32; 16],
    /// Grid column of the first control point of the window.
    pub u_index: usize,
    /// Grid row of the first control point of the window.
    pub v_index: usize,
    /// Position of this patch in the row-major order of all patches of the grid.
    pub index: usize,
    pub flags: PatchFlags,
}

impl BezierPatch {
    /// Control point index of row `row` and column `col` of the window.
    #[inline(always)]
    pub fn point(&self, col: usize, row: usize) -> usize {
        self.points[row * 4 + col] as usize
    }
}

/// Number of Bezier patches along an axis with `count` control points. Adjacent patches share
/// their edge control points.
#[inline(always)]
pub fn bezier_patch_count(count: usize) -> usize {
    count.saturating_sub(1) / 3
}

/// Slices a Bezier control grid into patches, yielded in row-major patch order.
pub fn bezier_patches(
    points: &[u32],
    count_u: usize,
    count_v: usize,
    flags: PatchFlags,
) -> impl Iterator<Item = BezierPatch> + '_ {
    let num_u = bezier_patch_count(count_u);
    let num_v = bezier_patch_count(count_v);

    (0..num_v).flat_map(move |patch_v| {
        (0..num_u).map(move |patch_u| {
            let u_index = patch_u * 3;
            let v_index = patch_v * 3;
            let points = std::array::from_fn(|k| {
                let u = u_index + k % 4;
                let v = v_index + k / 4;
                points[v * count_u + u]
            });

            BezierPatch {
                points,
                u_index,
                v_index,
                index: patch_v * num_u + patch_u,
                flags,
            }
        })
    })
}
