//! High quality tessellation: surfaces are evaluated on a regular parametric grid.
use color::Rgba;
use easyerr::ResultExt;
use glam::{Vec2, Vec3, Vec4};
use scratch::Scratch;
use zerocopy::{FromBytes, IntoBytes};

use super::{Attributes, TessCtx, TessError, surface_normal};
use crate::{
    basis::{self, Weighted},
    knots::{self, KnotDivisors},
    patch::{BezierPatch, SplinePatch},
    quad::MeshBuffer,
    vertex::SimpleVertex,
};

/// Grid density of a spline surface: `(u, v)` quads.
///
/// The density is proportional to the number of spans, reduced by `quality` (but never below
/// 2 on an axis because of it) and halved until the grid fits in `max_vertices`.
pub fn spline_density(patch: &SplinePatch, quality: usize, max_vertices: usize) -> (usize, usize) {
    let mut div_u = knots::span_count(patch.count_u) * patch.tess_u;
    let mut div_v = knots::span_count(patch.count_v) * patch.tess_v;

    if quality > 1 {
        if div_u > 2 {
            div_u /= quality;
        }

        if div_v > 2 {
            div_v /= quality;
        }
    }

    div_u = div_u.max(1);
    div_v = div_v.max(1);
    let mut halved = false;
    while (div_u + 1) * (div_v + 1) > max_vertices && (div_u > 1 || div_v > 1) {
        div_u = (div_u / 2).max(1);
        div_v = (div_v / 2).max(1);
        halved = true;
    }

    if halved {
        tracing::debug!("reduced spline density to {div_u}x{div_v} to fit {max_vertices} vertices");
    }

    (div_u, div_v)
}

pub fn spline(
    mesh: &mut MeshBuffer,
    scratch: &mut Scratch,
    control: &[SimpleVertex],
    patch: &SplinePatch,
    attrs: Attributes,
    quality: usize,
) -> Result<(), TessError> {
    let spans_u = knots::span_count(patch.count_u);
    let spans_v = knots::span_count(patch.count_v);

    let knots_u = scratch.allocate::<f32>(spans_u + 2).context(TessCtx::Scratch)?;
    let knots_v = scratch.allocate::<f32>(spans_v + 2).context(TessCtx::Scratch)?;
    let divs_u = scratch
        .allocate::<KnotDivisors>(spans_u)
        .context(TessCtx::Scratch)?;
    let divs_v = scratch
        .allocate::<KnotDivisors>(spans_v)
        .context(TessCtx::Scratch)?;

    knots::build(patch.boundary_u, knots_u, divs_u);
    knots::build(patch.boundary_v, knots_v, divs_v);

    let (div_u, div_v) = spline_density(patch, quality, mesh.vertex_capacity());
    let inv_u = 1.0 / div_u as f32;
    let inv_v = 1.0 / div_v as f32;

    let first = control[patch.point(0, 0)];
    let (base, vertices) = mesh
        .reserve((div_u + 1) * (div_v + 1))
        .context(TessCtx::Mesh)?;

    for tile_v in 0..=div_v {
        let v = (tile_v as f32 * spans_v as f32 * inv_v).max(0.0);
        let iv = (v as usize).min(spans_v - 1);
        let basis_v = basis::spline_n_4(iv, v, knots_v, &divs_v[iv]);
        let height = (patch.count_v - iv).min(4);

        for tile_u in 0..=div_u {
            let u = (tile_u as f32 * spans_u as f32 * inv_u).max(0.0);
            let iu = (u as usize).min(spans_u - 1);
            let basis_u = basis::spline_n_4(iu, u, knots_u, &divs_u[iu]);
            let width = (patch.count_u - iu).min(4);

            let mut position = Vec3::ZERO;
            let mut color = Vec4::ZERO;
            let mut uv = Vec2::ZERO;
            let mut du = Vec3::ZERO;
            let mut dv = Vec3::ZERO;

            for jj in 0..height {
                for ii in 0..width {
                    let point = &control[patch.point(iu + ii, iv + jj)];
                    if attrs.normals {
                        du += point.position * (basis_u.derivatives[ii] * basis_v.weights[jj]);
                        dv += point.position * (basis_u.weights[ii] * basis_v.derivatives[jj]);
                    }

                    let weight = basis_u.weights[ii] * basis_v.weights[jj];
                    if weight <= 0.0 {
                        continue;
                    }

                    position += point.position * weight;

                    if attrs.tex_coords {
                        uv += point.uv * weight;
                    }

                    if attrs.colors {
                        color += Vec4::from(point.color) * weight;
                    }
                }
            }

            let vertex = &mut vertices[tile_v * (div_u + 1) + tile_u];
            vertex.position = position;
            vertex.uv = if attrs.tex_coords {
                uv
            } else {
                Vec2::new(
                    spans_u as f32 * (tile_u as f32 * inv_u),
                    spans_v as f32 * (tile_v as f32 * inv_v),
                )
            };
            vertex.color = if attrs.colors {
                Rgba::from(color).to_rgba8()
            } else {
                first.color
            };
            vertex.normal = if attrs.normals {
                surface_normal(du, dv, patch.flags.patch_facing)
            } else {
                Vec3::Z
            };
        }
    }

    mesh.push_grid(patch.flags.primitive, base, div_u, div_v)
        .context(TessCtx::Mesh)?;

    Ok(())
}

/// Per-patch grid density of a Bezier surface with `patches` patches.
///
/// Both axes are halved until every patch fits in `max_vertices`, but never below 1.
pub fn bezier_density(
    tess_u: usize,
    tess_v: usize,
    patches: usize,
    max_vertices: usize,
) -> (usize, usize) {
    let mut tess_u = tess_u.max(1);
    let mut tess_v = tess_v.max(1);
    while (tess_u + 1) * (tess_v + 1) * patches > max_vertices && (tess_u > 1 || tess_v > 1) {
        tess_u = (tess_u / 2).max(1);
        tess_v = (tess_v / 2).max(1);
    }

    (tess_u, tess_v)
}

/// The four horizontal curves of a Bezier patch, each sampled at the same `u` parameters.
struct Curves<'a, T> {
    rows: [&'a mut [T]; 4],
}

impl<'a, T> Curves<'a, T>
where
    T: Weighted + FromBytes + IntoBytes,
{
    fn new(scratch: &mut Scratch<'a>, len: usize) -> Result<Self, TessError> {
        let all = scratch.allocate::<T>(len * 4).context(TessCtx::Scratch)?;
        let (r0, rest) = all.split_at_mut(len);
        let (r1, rest) = rest.split_at_mut(len);
        let (r2, r3) = rest.split_at_mut(len);

        Ok(Self {
            rows: [r0, r1, r2, r3],
        })
    }

    /// Samples every row of the patch at parameter `u`, storing the results at column `i`.
    fn sample(&mut self, i: usize, u: f32, row: impl Fn(usize) -> [T; 4], derivative: bool) {
        for (r, curve) in self.rows.iter_mut().enumerate() {
            let [p0, p1, p2, p3] = row(r);
            curve[i] = if derivative {
                basis::bernstein_derivative(p0, p1, p2, p3, u)
            } else {
                basis::bernstein(p0, p1, p2, p3, u)
            };
        }
    }

    #[inline(always)]
    fn bernstein(&self, i: usize, v: f32) -> T {
        let [r0, r1, r2, r3] = &self.rows;
        basis::bernstein(r0[i], r1[i], r2[i], r3[i], v)
    }

    #[inline(always)]
    fn bernstein_derivative(&self, i: usize, v: f32) -> T {
        let [r0, r1, r2, r3] = &self.rows;
        basis::bernstein_derivative(r0[i], r1[i], r2[i], r3[i], v)
    }
}

/// Horizontal curves of a Bezier patch, allocated once and reused for every patch of a
/// submission with the same density.
pub struct BezierCurves<'a> {
    tess_u: usize,
    position: Curves<'a, Vec3>,
    color: Option<Curves<'a, Vec4>>,
    uv: Option<Curves<'a, Vec2>>,
    derivative: Option<Curves<'a, Vec3>>,
}

impl<'a> BezierCurves<'a> {
    pub fn new(scratch: &mut Scratch<'a>, tess_u: usize, attrs: Attributes) -> Result<Self, TessError> {
        let len = tess_u + 1;
        Ok(Self {
            tess_u,
            position: Curves::new(scratch, len)?,
            color: attrs.colors.then(|| Curves::new(scratch, len)).transpose()?,
            uv: attrs.tex_coords.then(|| Curves::new(scratch, len)).transpose()?,
            derivative: attrs.normals.then(|| Curves::new(scratch, len)).transpose()?,
        })
    }
}

/// Tessellates a single Bezier patch into a `tess_u x tess_v` grid. `curves` must have been
/// created with the same `tess_u`.
pub fn bezier(
    mesh: &mut MeshBuffer,
    curves: &mut BezierCurves,
    control: &[SimpleVertex],
    patch: &BezierPatch,
    tess_v: usize,
) -> Result<(), TessError> {
    let tess_u = curves.tess_u;
    let point = |col: usize, row: usize| &control[patch.point(col, row)];

    for i in 0..=tess_u {
        let u = i as f32 / tess_u as f32;
        let positions = |r: usize| std::array::from_fn(|c| point(c, r).position);

        curves.position.sample(i, u, positions, false);

        if let Some(color) = &mut curves.color {
            color.sample(i, u, |r| std::array::from_fn(|c| Vec4::from(point(c, r).color)), false);
        }

        if let Some(uv) = &mut curves.uv {
            uv.sample(i, u, |r| std::array::from_fn(|c| point(c, r).uv), false);
        }

        if let Some(derivative) = &mut curves.derivative {
            derivative.sample(i, u, positions, true);
        }
    }

    let first = point(0, 0);
    let uv_base = Vec2::new(patch.u_index as f32, patch.v_index as f32) / 3.0;
    let (base, vertices) = mesh
        .reserve((tess_u + 1) * (tess_v + 1))
        .context(TessCtx::Mesh)?;

    for tile_v in 0..=tess_v {
        let v = tile_v as f32 / tess_v as f32;
        for tile_u in 0..=tess_u {
            let u = tile_u as f32 / tess_u as f32;
            let vertex = &mut vertices[tile_v * (tess_u + 1) + tile_u];

            vertex.position = curves.position.bernstein(tile_u, v);
            vertex.normal = match &curves.derivative {
                Some(derivative) => {
                    let du = derivative.bernstein(tile_u, v);
                    let dv = curves.position.bernstein_derivative(tile_u, v);
                    surface_normal(du, dv, patch.flags.patch_facing)
                }
                None => Vec3::Z,
            };
            vertex.uv = match &curves.uv {
                Some(uv) => uv.bernstein(tile_u, v),
                None => uv_base + Vec2::new(u, v),
            };
            vertex.color = match &curves.color {
                Some(color) => Rgba::from(color.bernstein(tile_u, v)).to_rgba8(),
                None => first.color,
            };
        }
    }

    mesh.push_grid(patch.flags.primitive, base, tess_u, tess_v)
        .context(TessCtx::Mesh)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        knots::Boundary,
        patch::{self, PatchFlags},
    };
    use color::Rgba8;

    const EPSILON: f32 = 1e-4;

    fn flat_grid(count_u: usize, count_v: usize) -> (Vec<SimpleVertex>, Vec<u32>) {
        let control = (0..count_u * count_v)
            .map(|i| SimpleVertex {
                position: Vec3::new((i % count_u) as f32, (i / count_u) as f32, 0.0),
                color: Rgba8::new(10, 20, 30, 255),
                ..Default::default()
            })
            .collect();
        let points = (0..(count_u * count_v) as u32).collect();
        (control, points)
    }

    fn spline_patch(points: &[u32], count: usize, tess: usize, boundary: Boundary) -> SplinePatch<'_> {
        SplinePatch {
            points,
            count_u: count,
            count_v: count,
            tess_u: tess,
            tess_v: tess,
            boundary_u: boundary,
            boundary_v: boundary,
            flags: PatchFlags {
                compute_normals: true,
                ..Default::default()
            },
        }
    }

    const ALL: Attributes = Attributes {
        normals: true,
        colors: true,
        tex_coords: false,
    };

    #[test]
    fn density_is_halved_to_fit() {
        let points = [0; 16];
        let patch = spline_patch(&points, 4, 300, Boundary::CLOSED);

        let (u, v) = spline_density(&patch, 1, 1000);
        assert!((u + 1) * (v + 1) <= 1000);
        assert_eq!((u, v), (18, 18));
    }

    #[test]
    fn bezier_density_fits_all_patches() {
        assert_eq!(bezier_density(0, 0, 1, 1000), (1, 1));
        assert_eq!(bezier_density(16, 16, 4, 1000), (8, 8));
        assert_eq!(bezier_density(64, 2, 1, 100), (32, 1));
        assert_eq!(bezier_density(4, 4, 10_000, 100), (1, 1));
    }

    #[test]
    fn bezier_density_keeps_short_axis_at_one() {
        let patches = 84 * 84;
        let (u, v) = bezier_density(1, 64, patches, 65536);
        assert_eq!((u, v), (1, 2));
        assert!((u + 1) * (v + 1) * patches <= 65536);

        assert_eq!(bezier_density(1, 10, 1, 8), (1, 2));
    }

    #[test]
    fn spline_density_keeps_short_axis_at_one() {
        let points = [0; 16];
        let mut patch = spline_patch(&points, 4, 1, Boundary::CLOSED);
        patch.tess_v = 10;

        let (u, v) = spline_density(&patch, 1, 8);
        assert!((u + 1) * (v + 1) <= 8);
        assert_eq!((u, v), (1, 2));
    }

    #[test]
    fn medium_quality_keeps_small_densities() {
        let points = [0; 16];
        let patch = spline_patch(&points, 4, 2, Boundary::CLOSED);
        assert_eq!(spline_density(&patch, 2, 1000), (2, 2));

        let patch = spline_patch(&points, 4, 8, Boundary::CLOSED);
        assert_eq!(spline_density(&patch, 2, 1000), (4, 4));
    }

    #[test]
    fn open_spline_reaches_corners() {
        let (control, points) = flat_grid(4, 4);
        let patch = spline_patch(&points, 4, 4, Boundary::OPEN);

        let mut vertices = vec![SimpleVertex::default(); 64];
        let mut indices = vec![0u16; 256];
        let mut arena = vec![0u8; 4096];
        let mut scratch = Scratch::new(&mut arena);
        let mut mesh = MeshBuffer::new(&mut vertices, &mut indices);
        spline(&mut mesh, &mut scratch, &control, &patch, ALL, 1).unwrap();

        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.index_count(), 4 * 4 * 6);

        let vertices = mesh.vertices();
        assert!(vertices[0].position.length() < EPSILON);
        assert!((vertices[24].position - Vec3::new(3.0, 3.0, 0.0)).length() < EPSILON);
        assert_eq!(vertices[24].uv, Vec2::new(1.0, 1.0));
        for vertex in vertices {
            assert_eq!(vertex.color, Rgba8::new(10, 20, 30, 255));
            assert!((vertex.normal - Vec3::Z).length() < EPSILON);
        }
    }

    #[test]
    fn bezier_patch_grid() {
        let (control, points) = flat_grid(4, 4);
        let flags = PatchFlags {
            compute_normals: true,
            patch_facing: true,
            ..Default::default()
        };
        let patch = patch::bezier_patches(&points, 4, 4, flags).next().unwrap();

        let mut vertices = vec![SimpleVertex::default(); 64];
        let mut indices = vec![0u16; 256];
        let mut arena = vec![0u8; 4096];
        let mut scratch = Scratch::new(&mut arena);
        let mut mesh = MeshBuffer::new(&mut vertices, &mut indices);

        let mut curves = BezierCurves::new(&mut scratch, 2, ALL).unwrap();
        bezier(&mut mesh, &mut curves, &control, &patch, 3).unwrap();

        assert_eq!(mesh.vertex_count(), 3 * 4);
        assert_eq!(mesh.index_count(), 2 * 3 * 6);

        let vertices = mesh.vertices();
        assert_eq!(vertices[0].position, Vec3::ZERO);
        assert_eq!(vertices[11].position, Vec3::new(3.0, 3.0, 0.0));
        assert!((vertices[4].position - Vec3::new(1.5, 1.0, 0.0)).length() < EPSILON);
        assert_eq!(vertices[11].uv, Vec2::ONE);
        assert!((vertices[4].normal - Vec3::NEG_Z).length() < EPSILON);
    }

    #[test]
    fn missing_normals_point_up() {
        let (control, points) = flat_grid(4, 4);
        let patch = patch::bezier_patches(&points, 4, 4, PatchFlags::default())
            .next()
            .unwrap();

        let mut vertices = vec![SimpleVertex::default(); 16];
        let mut indices = vec![0u16; 64];
        let mut arena = vec![0u8; 4096];
        let mut scratch = Scratch::new(&mut arena);
        let mut mesh = MeshBuffer::new(&mut vertices, &mut indices);

        let attrs = Attributes {
            normals: false,
            colors: false,
            tex_coords: false,
        };
        let mut curves = BezierCurves::new(&mut scratch, 1, attrs).unwrap();
        bezier(&mut mesh, &mut curves, &control, &patch, 1).unwrap();

        assert!(mesh.vertices().iter().all(|v| v.normal == Vec3::Z));
        assert!(mesh.vertices().iter().all(|v| v.color == control[0].color));
    }
}
