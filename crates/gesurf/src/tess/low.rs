//! Low quality tessellation: control points are drawn as they are, one quad per tile.
use easyerr::ResultExt;
use glam::Vec2;

use super::{Attributes, TessCtx, TessError, surface_normal};
use crate::{
    patch::{BezierPatch, PatchFlags, SplinePatch},
    quad::MeshBuffer,
    vertex::SimpleVertex,
};

/// Emits a quad with corners `[top left, top right, bottom left, bottom right]`.
fn emit_quad(
    mesh: &mut MeshBuffer,
    mut corners: [SimpleVertex; 4],
    flags: PatchFlags,
    attrs: Attributes,
) -> Result<(), TessError> {
    if attrs.normals {
        let [v0, v1, v2, _] = &corners;
        let normal = surface_normal(
            v1.position - v0.position,
            v2.position - v0.position,
            flags.patch_facing,
        );

        for corner in &mut corners {
            corner.normal = normal;
        }
    }

    let (base, vertices) = mesh.reserve(4).context(TessCtx::Mesh)?;
    vertices.copy_from_slice(&corners);
    mesh.push_quad(flags.primitive, [base, base + 1, base + 2, base + 3])
        .context(TessCtx::Mesh)?;

    Ok(())
}

/// Synthesizes texture coordinates spanning `origin..origin + size` over the corners.
fn synthesize_uv(corners: &mut [SimpleVertex; 4], origin: Vec2, size: Vec2) {
    corners[0].uv = origin;
    corners[1].uv = origin + Vec2::new(size.x, 0.0);
    corners[2].uv = origin + Vec2::new(0.0, size.y);
    corners[3].uv = origin + size;
}

pub fn spline(
    mesh: &mut MeshBuffer,
    control: &[SimpleVertex],
    patch: &SplinePatch,
    attrs: Attributes,
) -> Result<(), TessError> {
    let tile_min_u = if patch.boundary_u.start_open { 0 } else { 1 };
    let tile_min_v = if patch.boundary_v.start_open { 0 } else { 1 };
    let tile_max_u = if patch.boundary_u.end_open {
        patch.count_u - 1
    } else {
        patch.count_u - 2
    };
    let tile_max_v = if patch.boundary_v.end_open {
        patch.count_v - 1
    } else {
        patch.count_v - 2
    };

    let tile_size = Vec2::new(
        (patch.count_u - 3) as f32 / (tile_max_u - tile_min_u) as f32,
        (patch.count_v - 3) as f32 / (tile_max_v - tile_min_v) as f32,
    );

    for tile_v in tile_min_v..tile_max_v {
        for tile_u in tile_min_u..tile_max_u {
            let mut corners = [
                control[patch.point(tile_u, tile_v)],
                control[patch.point(tile_u + 1, tile_v)],
                control[patch.point(tile_u, tile_v + 1)],
                control[patch.point(tile_u + 1, tile_v + 1)],
            ];

            if !attrs.tex_coords {
                let tile = Vec2::new((tile_u - tile_min_u) as f32, (tile_v - tile_min_v) as f32);
                synthesize_uv(&mut corners, tile * tile_size, tile_size);
            }

            emit_quad(mesh, corners, patch.flags, attrs)?;
        }
    }

    Ok(())
}

pub fn bezier(
    mesh: &mut MeshBuffer,
    control: &[SimpleVertex],
    patch: &BezierPatch,
    attrs: Attributes,
) -> Result<(), TessError> {
    let mut corners = [
        control[patch.point(0, 0)],
        control[patch.point(3, 0)],
        control[patch.point(0, 3)],
        control[patch.point(3, 3)],
    ];

    if !attrs.tex_coords {
        let origin = Vec2::new((patch.u_index / 3) as f32, (patch.v_index / 3) as f32);
        synthesize_uv(&mut corners, origin, Vec2::ONE);
    }

    emit_quad(mesh, corners, patch.flags, attrs)
}
