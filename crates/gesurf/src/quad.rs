//! Output mesh buffers and quad index emission.
use easyerr::Error;

use crate::{config::MAX_VERTICES, vertex::PatchPrimitive, vertex::SimpleVertex};

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh needs {required} vertices but only {capacity} fit")]
    Vertices { required: usize, capacity: usize },
    #[error("mesh needs {required} indices but only {capacity} fit")]
    Indices { required: usize, capacity: usize },
}

/// The six indices of a quad with corners `[top left, top right, bottom left, bottom right]`.
///
/// Lines trace the quad's edges, while triangles and points split it into two triangles.
#[inline(always)]
pub fn quad_indices(primitive: PatchPrimitive, corners: [u16; 4]) -> [u16; 6] {
    let [i0, i1, i2, i3] = corners;
    match primitive {
        PatchPrimitive::Lines => [i0, i2, i1, i3, i1, i2],
        PatchPrimitive::Triangles | PatchPrimitive::Points => [i0, i2, i1, i1, i2, i3],
    }
}

/// Vertex and index buffers a tessellator writes its mesh into.
pub struct MeshBuffer<'a> {
    vertices: &'a mut [SimpleVertex],
    indices: &'a mut [u16],
    vertex_count: usize,
    index_count: usize,
}

impl<'a> MeshBuffer<'a> {
    /// Wraps the given buffers. At most [`MAX_VERTICES`] vertices are used so that every vertex
    /// can be addressed by a 16-bit index.
    pub fn new(vertices: &'a mut [SimpleVertex], indices: &'a mut [u16]) -> Self {
        let len = vertices.len().min(MAX_VERTICES);
        Self {
            vertices: &mut vertices[..len],
            indices,
            vertex_count: 0,
            index_count: 0,
        }
    }

    #[inline(always)]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    #[inline(always)]
    pub fn index_capacity(&self) -> usize {
        self.indices.len()
    }

    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline(always)]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// The vertices written so far.
    #[inline(always)]
    pub fn vertices(&self) -> &[SimpleVertex] {
        &self.vertices[..self.vertex_count]
    }

    /// The indices written so far.
    #[inline(always)]
    pub fn indices(&self) -> &[u16] {
        &self.indices[..self.index_count]
    }

    /// Reserves the next `count` vertices, returning the index of the first one and the slice to
    /// write them into.
    pub fn reserve(&mut self, count: usize) -> Result<(u16, &mut [SimpleVertex]), MeshError> {
        let start = self.vertex_count;
        let end = start + count;
        if end > self.vertices.len() {
            return Err(MeshError::Vertices {
                required: end,
                capacity: self.vertices.len(),
            });
        }

        self.vertex_count = end;
        Ok((start as u16, &mut self.vertices[start..end]))
    }

    /// Appends the indices of a single quad.
    pub fn push_quad(
        &mut self,
        primitive: PatchPrimitive,
        corners: [u16; 4],
    ) -> Result<(), MeshError> {
        let start = self.index_count;
        let end = start + 6;
        if end > self.indices.len() {
            return Err(MeshError::Indices {
                required: end,
                capacity: self.indices.len(),
            });
        }

        self.indices[start..end].copy_from_slice(&quad_indices(primitive, corners));
        self.index_count = end;

        Ok(())
    }

    /// Appends the indices of a grid of `width x height` quads whose `(width + 1) x (height + 1)`
    /// vertices were written row-major starting at `base`.
    pub fn push_grid(
        &mut self,
        primitive: PatchPrimitive,
        base: u16,
        width: usize,
        height: usize,
    ) -> Result<(), MeshError> {
        let required = self.index_count + width * height * 6;
        if required > self.indices.len() {
            return Err(MeshError::Indices {
                required,
                capacity: self.indices.len(),
            });
        }

        let stride = width + 1;
        for v in 0..height {
            for u in 0..width {
                let i0 = base as usize + v * stride + u;
                let i2 = i0 + stride;
                let corners = [i0 as u16, (i0 + 1) as u16, i2 as u16, (i2 + 1) as u16];
                self.push_quad(primitive, corners)?;
            }
        }

        Ok(())
    }
}
