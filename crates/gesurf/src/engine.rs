//! The draw engine, entry point of curved surface draws.
//!
//! A submission goes through the same steps for both splines and Bezier surfaces:
//! - pending draws are flushed
//! - control points are decoded into [`SimpleVertex`] through the vertex module
//! - the surface is tessellated, either in software or by preparing a parametric grid for the
//!   hardware tessellator
//! - the resulting mesh is submitted to the draw module and flushed
use easyerr::{Error, ResultExt};
use scratch::{AllocError, Scratch};
use zerocopy::IntoBytes;

use crate::{
    config::{Config, Quality},
    index::{self, IndexBounds, IndexError},
    knots::{self, Boundary},
    modules::{
        Modules,
        draw::{Draw, DrawModule},
        vertex::{Ctx as VertexCtx, NormalizeError},
    },
    patch::{self, PatchFlags, SplinePatch},
    quad::MeshBuffer,
    state::{GpuState, UvOverride},
    tess::{Attributes, TessError, hardware, high, low},
    vertex::{IndexFormat, SimpleVertex, VertexType},
};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Index { source: IndexError },
    #[error(transparent)]
    Normalize { source: NormalizeError },
    #[error(transparent)]
    Scratch { source: AllocError },
    #[error(transparent)]
    Tessellation { source: TessError },
    #[error("decoded vertices are {actual} bytes long but {expected} bytes were expected")]
    VertexSizeMismatch { expected: usize, actual: usize },
}

/// A curved surface draw, as issued by the GE.
#[derive(Debug, Clone, Copy)]
pub struct PatchData<'a> {
    /// Raw vertex data of the control points, in the layout described by `vertex_type`.
    pub control_points: &'a [u8],
    /// Raw index data, if the draw is indexed.
    pub indices: Option<&'a [u8]>,
    pub vertex_type: VertexType,
    pub count_u: usize,
    pub count_v: usize,
    pub tess_u: usize,
    pub tess_v: usize,
    pub flags: PatchFlags,
}

impl PatchData<'_> {
    /// Whether the control grid is too small to draw anything.
    #[inline(always)]
    pub fn is_degenerate(&self) -> bool {
        self.count_u < 4 || self.count_v < 4
    }
}

/// Summary of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Submitted {
    /// Bytes of control point data consumed by the draw.
    pub bytes_read: usize,
    pub vertex_count: usize,
    pub index_count: usize,
    /// Number of patches handed to the hardware tessellator. Zero if tessellated in software.
    pub hardware_patches: usize,
}

/// Decoded control points of a submission.
struct Prepared<'a> {
    control: &'a [SimpleVertex],
    points: &'a [u32],
    vertex_type: VertexType,
    bytes_read: usize,
}

fn prepare<'a>(
    modules: &mut Modules,
    scratch: &mut Scratch<'a>,
    state: &GpuState,
    data: &PatchData,
) -> Result<Prepared<'a>, SubmitError> {
    let count = data.count_u * data.count_v;
    let format = data.vertex_type.index();
    let bounds = match data.indices {
        Some(indices) => index::bounds(indices, format, count).context(SubmitCtx::Index)?,
        None => IndexBounds::sequential(count),
    };

    let bytes_read = count * modules.vertex.vertex_size(data.vertex_type);

    let control = scratch
        .allocate::<SimpleVertex>(bounds.required_len())
        .context(SubmitCtx::Scratch)?;

    let ctx = VertexCtx {
        uv: state.uv,
        material_color: state.material_color,
    };

    let vertex_type = modules
        .vertex
        .normalize(ctx, data.vertex_type, data.control_points, bounds, control)
        .context(SubmitCtx::Normalize)?;

    let actual = modules.vertex.vertex_size(vertex_type);
    if actual != size_of::<SimpleVertex>() {
        return Err(SubmitError::VertexSizeMismatch {
            expected: size_of::<SimpleVertex>(),
            actual,
        });
    }

    let points = scratch.allocate::<u32>(count).context(SubmitCtx::Scratch)?;
    index::expand(data.indices, format, points).context(SubmitCtx::Index)?;

    tracing::debug!(
        lower = bounds.lower,
        upper = bounds.upper,
        arena = scratch.capacity(),
        "decoded {} control points",
        bounds.required_len() - bounds.lower as usize
    );

    Ok(Prepared {
        control,
        points,
        vertex_type,
        bytes_read,
    })
}

/// Submits the mesh to the draw module and flushes it.
fn finish(
    draw: &mut dyn DrawModule,
    mesh: &MeshBuffer,
    uv: &UvOverride,
    prepared: &Prepared,
    flags: PatchFlags,
    hardware_patches: usize,
) -> Submitted {
    let vertex_type = prepared.vertex_type.with_index(IndexFormat::U16);
    draw.submit(Draw {
        vertices: mesh.vertices().as_bytes(),
        vertex_count: mesh.vertex_count(),
        indices: mesh.indices(),
        primitive: flags.primitive.primitive(),
        vertex_type,
        uv: uv.current(),
        hardware: hardware_patches > 0,
    });

    draw.flush();

    Submitted {
        bytes_read: prepared.bytes_read,
        vertex_count: mesh.vertex_count(),
        index_count: mesh.index_count(),
        hardware_patches,
    }
}

pub struct DrawEngine {
    config: Config,
    modules: Modules,
    arena: Box<[u8]>,
    vertices: Box<[SimpleVertex]>,
    indices: Box<[u16]>,
}

impl DrawEngine {
    pub fn new(config: Config, modules: Modules) -> Self {
        let arena = vec![0; config.arena_size].into_boxed_slice();
        let vertices = vec![SimpleVertex::default(); config.vertex_capacity()].into_boxed_slice();
        let indices = vec![0; config.index_capacity()].into_boxed_slice();

        Self {
            config,
            modules,
            arena,
            vertices,
            indices,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration, reallocating buffers whose size changed.
    pub fn set_config(&mut self, config: Config) {
        if config.arena_size != self.arena.len() {
            self.arena = vec![0; config.arena_size].into_boxed_slice();
        }

        if config.vertex_capacity() != self.vertices.len() {
            self.vertices = vec![SimpleVertex::default(); config.vertex_capacity()].into_boxed_slice();
            self.indices = vec![0; config.index_capacity()].into_boxed_slice();
        }

        self.config = config;
    }

    #[inline(always)]
    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    #[inline(always)]
    pub fn modules_mut(&mut self) -> &mut Modules {
        &mut self.modules
    }

    /// Whether a patch of the given primitive should be tessellated by the host GPU.
    pub fn uses_hardware_tessellation(&self, flags: PatchFlags) -> bool {
        self.config.hardware_tessellation
            && !self.config.software_rendering
            && self
                .modules
                .draw
                .supports_hardware_transform(flags.primitive.primitive())
    }

    /// Draws a spline surface.
    pub fn submit_spline(
        &mut self,
        state: &mut GpuState,
        data: &PatchData,
        boundary_u: Boundary,
        boundary_v: Boundary,
    ) -> Result<Submitted, SubmitError> {
        let _span =
            tracing::debug_span!("spline", count_u = data.count_u, count_v = data.count_v).entered();

        let hardware = self.uses_hardware_tessellation(data.flags);
        let Self {
            config,
            modules,
            arena,
            vertices,
            indices,
        } = self;

        modules.draw.flush();
        if data.is_degenerate() {
            tracing::debug!("control grid smaller than 4x4, nothing to draw");
            return Ok(Submitted::default());
        }

        let mut scratch = Scratch::new(arena);
        let prepared = prepare(modules, &mut scratch, state, data)?;
        let attrs = Attributes::new(data.vertex_type, data.flags.compute_normals);

        let patch = SplinePatch {
            points: prepared.points,
            count_u: data.count_u,
            count_v: data.count_v,
            tess_u: data.tess_u.max(1),
            tess_v: data.tess_v.max(1),
            boundary_u,
            boundary_v,
            flags: data.flags,
        };

        let mut mesh = MeshBuffer::new(vertices, indices);
        let uv = UvOverride::new(&mut state.uv, attrs.tex_coords);

        let mut hardware_patches = 0;
        if hardware {
            hardware::send_control_points(
                modules.tess.as_mut(),
                &mut scratch,
                prepared.control,
                prepared.points,
                attrs,
            )
            .context(SubmitCtx::Tessellation)?;

            hardware::grid(&mut mesh, data.flags.primitive, patch.tess_u, patch.tess_v)
                .context(SubmitCtx::Tessellation)?;

            hardware_patches =
                knots::span_count(data.count_u) * knots::span_count(data.count_v);
        } else {
            match config.quality {
                Quality::Low => low::spline(&mut mesh, prepared.control, &patch, attrs),
                quality => high::spline(
                    &mut mesh,
                    &mut scratch,
                    prepared.control,
                    &patch,
                    attrs,
                    quality.divisor(),
                ),
            }
            .context(SubmitCtx::Tessellation)?;
        }

        tracing::debug!(
            hardware,
            scratch = scratch.used(),
            remaining = scratch.remaining(),
            "tessellated spline into {} vertices",
            mesh.vertex_count()
        );

        let submitted = finish(
            modules.draw.as_mut(),
            &mesh,
            &uv,
            &prepared,
            data.flags,
            hardware_patches,
        );

        Ok(submitted)
    }

    /// Draws a Bezier surface.
    pub fn submit_bezier(
        &mut self,
        state: &mut GpuState,
        data: &PatchData,
    ) -> Result<Submitted, SubmitError> {
        let _span =
            tracing::debug_span!("bezier", count_u = data.count_u, count_v = data.count_v).entered();

        let hardware = self.uses_hardware_tessellation(data.flags);
        let Self {
            config,
            modules,
            arena,
            vertices,
            indices,
        } = self;

        modules.draw.flush();
        if data.is_degenerate() {
            tracing::debug!("control grid smaller than 4x4, nothing to draw");
            return Ok(Submitted::default());
        }

        let mut scratch = Scratch::new(arena);
        let prepared = prepare(modules, &mut scratch, state, data)?;
        let attrs = Attributes::new(data.vertex_type, data.flags.compute_normals);

        let tess_u = data.tess_u.max(1);
        let tess_v = data.tess_v.max(1);
        let patch_count =
            patch::bezier_patch_count(data.count_u) * patch::bezier_patch_count(data.count_v);

        let mut mesh = MeshBuffer::new(vertices, indices);
        let uv = UvOverride::new(&mut state.uv, attrs.tex_coords);

        let mut hardware_patches = 0;
        if hardware {
            hardware::send_control_points(
                modules.tess.as_mut(),
                &mut scratch,
                prepared.control,
                prepared.points,
                attrs,
            )
            .context(SubmitCtx::Tessellation)?;

            hardware::grid(&mut mesh, data.flags.primitive, tess_u, tess_v)
                .context(SubmitCtx::Tessellation)?;

            hardware_patches = patch_count;
        } else {
            let (tess_u, tess_v) =
                high::bezier_density(tess_u, tess_v, patch_count, mesh.vertex_capacity());
            let patches =
                patch::bezier_patches(prepared.points, data.count_u, data.count_v, data.flags);

            match config.quality {
                Quality::Low => {
                    for patch in patches {
                        low::bezier(&mut mesh, prepared.control, &patch, attrs)
                            .context(SubmitCtx::Tessellation)?;
                    }
                }
                quality => {
                    let tess_u = (tess_u / quality.divisor()).max(1);
                    let tess_v = (tess_v / quality.divisor()).max(1);
                    let mut curves = high::BezierCurves::new(&mut scratch, tess_u, attrs)
                        .context(SubmitCtx::Tessellation)?;

                    for patch in patches {
                        high::bezier(&mut mesh, &mut curves, prepared.control, &patch, tess_v)
                            .context(SubmitCtx::Tessellation)?;
                    }
                }
            }
        }

        tracing::debug!(
            hardware,
            patches = patch_count,
            scratch = scratch.used(),
            remaining = scratch.remaining(),
            "tessellated bezier into {} vertices",
            mesh.vertex_count()
        );

        let submitted = finish(
            modules.draw.as_mut(),
            &mesh,
            &uv,
            &prepared,
            data.flags,
            hardware_patches,
        );

        Ok(submitted)
    }
}
