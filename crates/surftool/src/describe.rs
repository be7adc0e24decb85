//! RON descriptions of curved surface draws.
use eyre_pretty::{Result, bail};
use gesurf::{
    PatchData,
    color::Rgba8,
    knots::Boundary,
    patch::PatchFlags,
    vertex::{ColorFormat, ComponentFormat, IndexFormat, PatchPrimitive, VertexType},
};
use serde::Deserialize;
use zerocopy::IntoBytes;

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum Kind {
    Bezier,
    Spline {
        #[serde(default)]
        boundary_u: Boundary,
        #[serde(default)]
        boundary_v: Boundary,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Point {
    pub position: [f32; 3],
    #[serde(default)]
    pub uv: Option<[f32; 2]>,
    #[serde(default)]
    pub color: Option<[u8; 4]>,
    #[serde(default)]
    pub normal: Option<[f32; 3]>,
}

impl Point {
    fn attributes(&self) -> (bool, bool, bool) {
        (self.uv.is_some(), self.color.is_some(), self.normal.is_some())
    }
}

/// A curved surface draw, as written by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    pub kind: Kind,
    pub count_u: usize,
    pub count_v: usize,
    pub tess_u: usize,
    pub tess_v: usize,
    #[serde(default)]
    pub primitive: PatchPrimitive,
    #[serde(default)]
    pub compute_normals: bool,
    #[serde(default)]
    pub patch_facing: bool,
    /// Color of points without one.
    #[serde(default)]
    pub material_color: Option<[u8; 4]>,
    /// Indices into `points`. Points are used in order if absent.
    #[serde(default)]
    pub indices: Option<Vec<u16>>,
    pub points: Vec<Point>,
}

/// A description encoded into raw GE vertex and index data.
pub struct Encoded {
    pub vertices: Vec<u8>,
    pub indices: Option<Vec<u8>>,
    pub vertex_type: VertexType,
}

impl Description {
    #[inline(always)]
    pub fn control_count(&self) -> usize {
        self.count_u * self.count_v
    }

    #[inline(always)]
    pub fn material_color(&self) -> Rgba8 {
        self.material_color
            .map(|[r, g, b, a]| Rgba8::new(r, g, b, a))
            .unwrap_or(Rgba8::WHITE)
    }

    /// Encodes the points with float components and RGBA8888 colors.
    pub fn encode(&self) -> Result<Encoded> {
        let Some(first) = self.points.first() else {
            bail!("patch has no control points");
        };

        let count = self.control_count();
        match &self.indices {
            Some(indices) => {
                if indices.len() != count {
                    bail!("expected {count} indices, found {}", indices.len());
                }

                if let Some(&max) = indices.iter().max()
                    && max as usize >= self.points.len()
                {
                    bail!(
                        "index {max} is out of bounds for {} points",
                        self.points.len()
                    );
                }
            }
            None => {
                if self.points.len() < count {
                    bail!(
                        "expected at least {count} points, found {}",
                        self.points.len()
                    );
                }
            }
        }

        let (uv, color, normal) = first.attributes();
        let mut vertex_type = VertexType::default().with_position(ComponentFormat::Float);
        if uv {
            vertex_type = vertex_type.with_tex_coords(ComponentFormat::Float);
        }
        if color {
            vertex_type = vertex_type.with_color(ColorFormat::Rgba8888);
        }
        if normal {
            vertex_type = vertex_type.with_normal(ComponentFormat::Float);
        }

        let mut vertices = vec![];
        for (i, point) in self.points.iter().enumerate() {
            if point.attributes() != (uv, color, normal) {
                bail!("point {i} does not have the same attributes as the first point");
            }

            if let Some(uv) = point.uv {
                vertices.extend_from_slice(uv.as_bytes());
            }
            if let Some([r, g, b, a]) = point.color {
                vertices.extend_from_slice(&Rgba8::new(r, g, b, a).to_u32().to_le_bytes());
            }
            if let Some(normal) = point.normal {
                vertices.extend_from_slice(normal.as_bytes());
            }
            vertices.extend_from_slice(point.position.as_bytes());
        }

        let indices = self.indices.as_ref().map(|indices| {
            vertex_type = vertex_type.with_index(IndexFormat::U16);
            indices.iter().flat_map(|i| i.to_le_bytes()).collect()
        });

        Ok(Encoded {
            vertices,
            indices,
            vertex_type,
        })
    }
}

impl Encoded {
    pub fn patch_data<'a>(&'a self, description: &Description) -> PatchData<'a> {
        PatchData {
            control_points: &self.vertices,
            indices: self.indices.as_deref(),
            vertex_type: self.vertex_type,
            count_u: description.count_u,
            count_v: description.count_v,
            tess_u: description.tess_u,
            tess_v: description.tess_v,
            flags: PatchFlags {
                primitive: description.primitive,
                compute_normals: description.compute_normals,
                patch_facing: description.patch_facing,
            },
        }
    }
}
