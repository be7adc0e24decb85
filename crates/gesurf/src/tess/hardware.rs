//! Hardware tessellation: the host GPU evaluates the surface, so only a parametric grid and the
//! control points are prepared here.
use color::Rgba;
use easyerr::ResultExt;
use glam::{Vec2, Vec4};
use scratch::Scratch;

use super::{Attributes, TessCtx, TessError};
use crate::{
    modules::tess::{ControlData, TessModule},
    quad::MeshBuffer,
    vertex::{PatchPrimitive, SimpleVertex},
};

/// Emits a `tess_u x tess_v` grid over the unit square. Each vertex position holds its parametric
/// coordinates and each normal holds the grid spacing.
pub fn grid(
    mesh: &mut MeshBuffer,
    primitive: PatchPrimitive,
    tess_u: usize,
    tess_v: usize,
) -> Result<(), TessError> {
    let inv = Vec2::new(1.0 / tess_u as f32, 1.0 / tess_v as f32);
    let (base, vertices) = mesh
        .reserve((tess_u + 1) * (tess_v + 1))
        .context(TessCtx::Mesh)?;

    for tile_v in 0..=tess_v {
        for tile_u in 0..=tess_u {
            let vertex = &mut vertices[tile_v * (tess_u + 1) + tile_u];
            let uv = Vec2::new(tile_u as f32, tile_v as f32) * inv;

            *vertex = SimpleVertex {
                position: uv.extend(0.0),
                normal: inv.extend(0.0),
                ..Default::default()
            };
        }
    }

    mesh.push_grid(primitive, base, tess_u, tess_v)
        .context(TessCtx::Mesh)?;

    Ok(())
}

/// Lays out the control points referenced by `points` in the buffers the tessellation module asks
/// for and sends them.
pub fn send_control_points(
    module: &mut dyn TessModule,
    scratch: &mut Scratch,
    control: &[SimpleVertex],
    points: &[u32],
    attrs: Attributes,
) -> Result<(), TessError> {
    let count = points.len();
    let strides = module.prepare(count, attrs.colors, attrs.tex_coords);
    if !strides.is_valid() {
        return Err(TessError::InvalidStrides(strides));
    }

    let positions = scratch
        .allocate::<f32>(count * strides.position)
        .context(TessCtx::Scratch)?;
    let mut tex_coords = if attrs.tex_coords {
        Some(
            scratch
                .allocate::<f32>(count * strides.tex_coords)
                .context(TessCtx::Scratch)?,
        )
    } else {
        None
    };
    let color_count = if attrs.colors { count } else { 1 };
    let colors = scratch
        .allocate::<f32>(color_count * strides.color)
        .context(TessCtx::Scratch)?;

    for (i, &point) in points.iter().enumerate() {
        let vertex = &control[point as usize];

        let position = &mut positions[i * strides.position..];
        vertex.position.write_to_slice(position);

        if let Some(tex_coords) = &mut tex_coords {
            vertex.uv.write_to_slice(&mut tex_coords[i * strides.tex_coords..]);
        }

        if attrs.colors || i == 0 {
            let color = Vec4::from(Rgba::from(vertex.color));
            color.write_to_slice(&mut colors[i * strides.color..]);
        }
    }

    module.send(ControlData {
        count,
        positions,
        tex_coords: tex_coords.as_deref(),
        colors,
        has_color: attrs.colors,
    });

    Ok(())
}
