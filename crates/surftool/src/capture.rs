//! A draw module that keeps the submitted meshes around.
use std::sync::{Arc, Mutex};

use gesurf::{
    modules::draw::{Draw, DrawModule},
    vertex::{Primitive, SimpleVertex},
};
use zerocopy::FromBytes;

pub struct Mesh {
    pub vertices: Vec<SimpleVertex>,
    pub indices: Vec<u16>,
    pub primitive: Primitive,
}

#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<Mesh>>>);

impl Captured {
    pub fn take(&self) -> Vec<Mesh> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

pub struct CaptureDrawModule {
    captured: Captured,
    flushes: usize,
}

impl CaptureDrawModule {
    pub fn new(captured: Captured) -> Self {
        Self {
            captured,
            flushes: 0,
        }
    }
}

impl DrawModule for CaptureDrawModule {
    fn flush(&mut self) {
        self.flushes += 1;
        tracing::trace!(flushes = self.flushes, "flush");
    }

    fn submit(&mut self, draw: Draw<'_>) -> usize {
        let vertices = draw
            .vertices
            .chunks_exact(size_of::<SimpleVertex>())
            .filter_map(|chunk| SimpleVertex::read_from_bytes(chunk).ok())
            .collect();

        self.captured.0.lock().unwrap().push(Mesh {
            vertices,
            indices: draw.indices.to_vec(),
            primitive: draw.primitive,
        });

        draw.vertices.len()
    }

    fn supports_hardware_transform(&self, _: Primitive) -> bool {
        false
    }
}
