//! Vertex decoding module interface.
mod interpreter;

use color::Rgba8;
use easyerr::Error;

use crate::{
    index::IndexBounds,
    state::UvScale,
    vertex::{SimpleVertex, VertexType},
};

#[derive(Clone, Copy)]
pub struct Ctx {
    /// Texture coordinate scale applied to decoded texture coordinates.
    pub uv: UvScale,
    /// Color of vertices without a color component.
    pub material_color: Rgba8,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("vertex type {f0:?} uses skinning weights, which are not supported")]
    Weights(VertexType),
    #[error("vertex type {f0:?} uses morphing, which is not supported")]
    Morph(VertexType),
    #[error("vertex type {f0:?} is in through mode, which is not supported")]
    Through(VertexType),
    #[error("vertex type {f0:?} has no position")]
    MissingPosition(VertexType),
    #[error("vertex type {f0:?} has a reserved color format")]
    ReservedColor(VertexType),
    #[error("vertex data holds {len} bytes but {required} are needed")]
    SourceTooShort { required: usize, len: usize },
    #[error("destination holds {len} vertices but {required} are needed")]
    DestinationTooShort { required: usize, len: usize },
}

/// Trait for vertex decoding modules.
pub trait VertexModule: Send {
    /// Size in bytes of a vertex of the given type.
    fn vertex_size(&self, vertex_type: VertexType) -> usize;

    /// Decodes the vertices in `bounds` from `src` into `dst`, where vertex `i` is stored at
    /// `dst[i]`. Returns the type of the decoded vertices, whose size must match the size of a
    /// [`SimpleVertex`].
    fn normalize(
        &mut self,
        ctx: Ctx,
        vertex_type: VertexType,
        src: &[u8],
        bounds: IndexBounds,
        dst: &mut [SimpleVertex],
    ) -> Result<VertexType, NormalizeError>;
}

/// The default vertex module.
pub use interpreter::Interpreter as InterpreterVertexModule;
