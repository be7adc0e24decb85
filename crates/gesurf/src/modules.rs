//! Engine modules.
//!
//! Modules provide the draw engine with functionality it does not implement itself, such as
//! decoding vertex formats or drawing, and let the host plug in its own backends.

pub mod draw;
pub mod tess;
pub mod vertex;

use draw::DrawModule;
use tess::TessModule;
use vertex::VertexModule;

pub struct Modules {
    pub vertex: Box<dyn VertexModule>,
    pub draw: Box<dyn DrawModule>,
    pub tess: Box<dyn TessModule>,
}

impl Default for Modules {
    fn default() -> Self {
        Self {
            vertex: Box::new(vertex::InterpreterVertexModule),
            draw: Box::new(draw::NopDrawModule),
            tess: Box::new(tess::NopTessModule),
        }
    }
}
