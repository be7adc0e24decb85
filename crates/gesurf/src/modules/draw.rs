//! Draw module interface.
use crate::{
    state::UvScale,
    vertex::{Primitive, VertexType},
};

/// A tessellated mesh ready to be drawn.
#[derive(Debug, Clone, Copy)]
pub struct Draw<'a> {
    /// Vertex data in the layout described by `vertex_type`.
    pub vertices: &'a [u8],
    pub vertex_count: usize,
    pub indices: &'a [u16],
    pub primitive: Primitive,
    pub vertex_type: VertexType,
    /// Texture coordinate scale in effect for this draw.
    pub uv: UvScale,
    /// Whether the mesh is a parametric grid to be evaluated by the hardware tessellator.
    pub hardware: bool,
}

/// Trait for draw modules.
pub trait DrawModule: Send {
    /// Flushes any pending draws.
    fn flush(&mut self);

    /// Queues a draw. Returns how many bytes of vertex data were consumed.
    fn submit(&mut self, draw: Draw<'_>) -> usize;

    /// Whether primitives of the given kind can be transformed on the host GPU.
    fn supports_hardware_transform(&self, primitive: Primitive) -> bool {
        let _ = primitive;
        false
    }
}

/// An implementation of [`DrawModule`] that does nothing.
#[derive(Debug, Clone, Copy)]
pub struct NopDrawModule;

impl DrawModule for NopDrawModule {
    fn flush(&mut self) {}

    fn submit(&mut self, draw: Draw<'_>) -> usize {
        draw.vertices.len()
    }
}
