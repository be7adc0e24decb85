//! Tessellators.
//!
//! Every tessellator reads decoded control points and writes a mesh of [`SimpleVertex`] into a
//! [`MeshBuffer`](crate::quad::MeshBuffer). Which attributes are derived from the control points
//! and which are synthesized is decided by [`Attributes`].
pub mod hardware;
pub mod high;
pub mod low;

use easyerr::Error;
use glam::Vec3;
use scratch::AllocError;

use crate::{
    modules::tess::Strides,
    quad::MeshError,
    vertex::{SimpleVertex, VertexType},
};

#[derive(Debug, Error)]
pub enum TessError {
    #[error(transparent)]
    Scratch { source: AllocError },
    #[error(transparent)]
    Mesh { source: MeshError },
    #[error("tessellation module returned invalid strides {f0:?}")]
    InvalidStrides(Strides),
}

/// Which vertex attributes are interpolated from the control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    /// Normals are derived from the surface. Otherwise, every normal is +Z.
    pub normals: bool,
    /// Colors are interpolated. Otherwise, every vertex takes the color of the first control
    /// point.
    pub colors: bool,
    /// Texture coordinates are interpolated. Otherwise, they are synthesized from the parametric
    /// position of each vertex.
    pub tex_coords: bool,
}

impl Attributes {
    /// Attributes of a submission whose control points were originally in the given format.
    ///
    /// Normals are keyed on `compute_normals` for splines too, not on whether the original
    /// format carries normals. Without it, both surface kinds get +Z normals.
    pub fn new(original: VertexType, compute_normals: bool) -> Self {
        Self {
            normals: compute_normals,
            colors: original.has_color(),
            tex_coords: original.has_tex_coords(),
        }
    }
}

/// Normal of a surface with the given partial derivatives.
#[inline(always)]
fn surface_normal(du: Vec3, dv: Vec3, facing: bool) -> Vec3 {
    let normal = du.cross(dv).normalize_or_zero();
    if facing { -normal } else { normal }
}
