use color::Rgba8;
use glam::{Vec2, Vec3};
use zerocopy::{
    FromBytes,
    little_endian::{F32, I16, U16, U32},
};

use crate::{
    index::IndexBounds,
    modules::vertex::{Ctx, NormalizeError, VertexModule},
    vertex::{ColorFormat, ComponentFormat, SimpleVertex, VertexType},
};

/// Offsets of each attribute within a vertex.
#[derive(Debug, Clone, Copy)]
struct Layout {
    size: usize,
    tex_coords: usize,
    color: usize,
    normal: usize,
    position: usize,
}

impl Layout {
    /// Attributes are stored in the order weights, texture coordinates, color, normal and
    /// position, each aligned to the size of its elements. The whole vertex is aligned to the
    /// largest element.
    fn new(vertex_type: VertexType) -> Self {
        struct Cursor {
            offset: usize,
            align: usize,
        }

        impl Cursor {
            fn place(&mut self, size: usize, count: usize) -> usize {
                if size == 0 {
                    return self.offset;
                }

                self.offset = self.offset.next_multiple_of(size);
                self.align = self.align.max(size);

                let offset = self.offset;
                self.offset += size * count;
                offset
            }
        }

        let mut cursor = Cursor {
            offset: 0,
            align: 1,
        };

        cursor.place(vertex_type.weight().size(), vertex_type.weight_count());
        let tex_coords = cursor.place(vertex_type.tex_coords().size(), 2);
        let color = cursor.place(vertex_type.color().size(), 1);
        let normal = cursor.place(vertex_type.normal().size(), 3);
        let position = cursor.place(vertex_type.position().size(), 3);

        Self {
            size: cursor.offset.next_multiple_of(cursor.align) * vertex_type.morph_count(),
            tex_coords,
            color,
            normal,
            position,
        }
    }
}

#[inline(always)]
fn read<T: FromBytes>(bytes: &[u8], offset: usize) -> Option<T> {
    T::read_from_prefix(bytes.get(offset..)?)
        .ok()
        .map(|(value, _)| value)
}

/// Reads `N` components. Fixed point components are scaled so that the largest magnitude maps to
/// about 1.0.
fn read_components<const N: usize>(
    bytes: &[u8],
    offset: usize,
    format: ComponentFormat,
    signed: bool,
) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    for (i, value) in out.iter_mut().enumerate() {
        *value = match format {
            ComponentFormat::None => 0.0,
            ComponentFormat::Fixed8 if signed => read::<i8>(bytes, offset + i)? as f32 / 128.0,
            ComponentFormat::Fixed8 => read::<u8>(bytes, offset + i)? as f32 / 128.0,
            ComponentFormat::Fixed16 if signed => {
                read::<I16>(bytes, offset + 2 * i)?.get() as f32 / 32768.0
            }
            ComponentFormat::Fixed16 => {
                read::<U16>(bytes, offset + 2 * i)?.get() as f32 / 32768.0
            }
            ComponentFormat::Float => read::<F32>(bytes, offset + 4 * i)?.get(),
        };
    }

    Some(out)
}

fn read_color(bytes: &[u8], offset: usize, format: ColorFormat) -> Option<Rgba8> {
    let packed = || read::<U16>(bytes, offset).map(|x| x.get());
    Some(match format {
        ColorFormat::Rgb565 => Rgba8::from_rgb565(packed()?),
        ColorFormat::Rgba5551 => Rgba8::from_rgba5551(packed()?),
        ColorFormat::Rgba4444 => Rgba8::from_rgba4444(packed()?),
        ColorFormat::Rgba8888 => Rgba8::from_u32(read::<U32>(bytes, offset)?.get()),
        _ => return None,
    })
}

/// Decodes vertices one by one.
pub struct Interpreter;

impl Interpreter {
    fn decode(ctx: &Ctx, vertex_type: VertexType, layout: &Layout, bytes: &[u8]) -> Option<SimpleVertex> {
        let uv = if vertex_type.has_tex_coords() {
            let [u, v] = read_components(bytes, layout.tex_coords, vertex_type.tex_coords(), false)?;
            Vec2::new(u * ctx.uv.u_scale + ctx.uv.u_off, v * ctx.uv.v_scale + ctx.uv.v_off)
        } else {
            Vec2::ZERO
        };

        let color = if vertex_type.has_color() {
            read_color(bytes, layout.color, vertex_type.color())?
        } else {
            ctx.material_color
        };

        let normal = read_components(bytes, layout.normal, vertex_type.normal(), true)?;
        let position = read_components(bytes, layout.position, vertex_type.position(), true)?;

        Some(SimpleVertex {
            uv,
            color,
            normal: Vec3::from_array(normal),
            position: Vec3::from_array(position),
        })
    }
}

impl VertexModule for Interpreter {
    fn vertex_size(&self, vertex_type: VertexType) -> usize {
        Layout::new(vertex_type).size
    }

    fn normalize(
        &mut self,
        ctx: Ctx,
        vertex_type: VertexType,
        src: &[u8],
        bounds: IndexBounds,
        dst: &mut [SimpleVertex],
    ) -> Result<VertexType, NormalizeError> {
        if vertex_type.weight() != ComponentFormat::None {
            return Err(NormalizeError::Weights(vertex_type));
        }

        if vertex_type.morph_count() > 1 {
            return Err(NormalizeError::Morph(vertex_type));
        }

        if vertex_type.through() {
            return Err(NormalizeError::Through(vertex_type));
        }

        if vertex_type.position() == ComponentFormat::None {
            return Err(NormalizeError::MissingPosition(vertex_type));
        }

        if matches!(
            vertex_type.color(),
            ColorFormat::Reserved0 | ColorFormat::Reserved1 | ColorFormat::Reserved2
        ) {
            return Err(NormalizeError::ReservedColor(vertex_type));
        }

        let required = bounds.required_len();
        if dst.len() < required {
            return Err(NormalizeError::DestinationTooShort {
                required,
                len: dst.len(),
            });
        }

        let layout = Layout::new(vertex_type);
        let too_short = || NormalizeError::SourceTooShort {
            required: required * layout.size,
            len: src.len(),
        };

        let data = src.get(..required * layout.size).ok_or_else(too_short)?;
        for i in bounds.lower as usize..required {
            let bytes = &data[i * layout.size..(i + 1) * layout.size];
            dst[i] = Self::decode(&ctx, vertex_type, &layout, bytes).ok_or_else(too_short)?;
        }

        Ok(VertexType::canonical())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::UvScale;
    use zerocopy::IntoBytes;

    fn ctx() -> Ctx {
        Ctx {
            uv: UvScale::IDENTITY,
            material_color: Rgba8::new(1, 2, 3, 4),
        }
    }

    #[test]
    fn canonical_layout_matches_simple_vertex() {
        let layout = Layout::new(VertexType::canonical());
        assert_eq!(layout.size, size_of::<SimpleVertex>());
        assert_eq!(layout.tex_coords, 0);
        assert_eq!(layout.color, 8);
        assert_eq!(layout.normal, 12);
        assert_eq!(layout.position, 24);
    }

    #[test]
    fn packed_layout() {
        let vertex_type = VertexType::default()
            .with_tex_coords(ComponentFormat::Fixed8)
            .with_color(ColorFormat::Rgb565)
            .with_normal(ComponentFormat::Fixed16)
            .with_position(ComponentFormat::Float);

        let layout = Layout::new(vertex_type);
        assert_eq!(layout.tex_coords, 0);
        assert_eq!(layout.color, 2);
        assert_eq!(layout.normal, 4);
        assert_eq!(layout.position, 12);
        assert_eq!(layout.size, 24);
        assert_eq!(Interpreter.vertex_size(vertex_type), 24);
    }

    #[test]
    fn decodes_packed_vertices() {
        let vertex_type = VertexType::default()
            .with_tex_coords(ComponentFormat::Fixed8)
            .with_color(ColorFormat::Rgb565)
            .with_normal(ComponentFormat::Fixed16)
            .with_position(ComponentFormat::Float);

        let mut src = vec![];
        for i in 0..3u8 {
            src.extend_from_slice(&[64, 128]);
            src.extend_from_slice(&0x001Fu16.to_le_bytes());
            for n in [0i16, -16384, 32767] {
                src.extend_from_slice(&n.to_le_bytes());
            }
            src.extend_from_slice(&[0, 0]);
            src.extend_from_slice([i as f32, 2.0, -1.0].as_bytes());
        }
        assert_eq!(src.len(), 3 * 24);

        let uv = UvScale {
            u_scale: 2.0,
            v_scale: 1.0,
            u_off: 0.5,
            v_off: 0.0,
        };
        let ctx = Ctx { uv, ..ctx() };

        let mut dst = [SimpleVertex::default(); 3];
        let bounds = IndexBounds { lower: 1, upper: 2 };
        let out = Interpreter
            .normalize(ctx, vertex_type, &src, bounds, &mut dst)
            .unwrap();

        assert_eq!(out.to_bits(), VertexType::canonical().to_bits());
        assert_eq!(dst[0], SimpleVertex::default());

        let vertex = dst[2];
        assert_eq!(vertex.uv, Vec2::new(1.5, 1.0));
        assert_eq!(vertex.color, Rgba8::new(255, 0, 0, 255));
        assert_eq!(vertex.normal, Vec3::new(0.0, -0.5, 32767.0 / 32768.0));
        assert_eq!(vertex.position, Vec3::new(2.0, 2.0, -1.0));
    }

    #[test]
    fn canonical_vertices_decode_to_themselves() {
        let vertices = [
            SimpleVertex {
                uv: Vec2::new(0.25, 0.75),
                color: Rgba8::new(0x10, 0x20, 0x30, 0x40),
                normal: Vec3::Y,
                position: Vec3::new(1.0, -2.0, 3.0),
            },
            SimpleVertex {
                color: Rgba8::WHITE,
                ..Default::default()
            },
        ];

        // little endian RGBA in the color word
        assert_eq!(vertices[0].as_bytes()[8..12], [0x10, 0x20, 0x30, 0x40]);

        let mut dst = [SimpleVertex::default(); 2];
        Interpreter
            .normalize(
                ctx(),
                VertexType::canonical(),
                vertices.as_bytes(),
                IndexBounds::sequential(2),
                &mut dst,
            )
            .unwrap();

        assert_eq!(dst, vertices);
    }

    #[test]
    fn missing_attributes_use_defaults() {
        let vertex_type = VertexType::default().with_position(ComponentFormat::Fixed8);
        let src = [127u8, 0x80, 0];

        let mut dst = [SimpleVertex::default(); 1];
        Interpreter
            .normalize(ctx(), vertex_type, &src, IndexBounds::sequential(1), &mut dst)
            .unwrap();

        assert_eq!(dst[0].color, Rgba8::new(1, 2, 3, 4));
        assert_eq!(dst[0].normal, Vec3::ZERO);
        assert_eq!(dst[0].position, Vec3::new(127.0 / 128.0, -1.0, 0.0));
    }

    #[test]
    fn rejects_unsupported_types() {
        let mut dst = [SimpleVertex::default(); 1];
        let bounds = IndexBounds::sequential(1);
        let src = [0u8; 64];

        let weighted = VertexType::canonical().with_weight(ComponentFormat::Float);
        assert!(matches!(
            Interpreter.normalize(ctx(), weighted, &src, bounds, &mut dst),
            Err(NormalizeError::Weights(_))
        ));

        let through = VertexType::canonical().with_through(true);
        assert!(matches!(
            Interpreter.normalize(ctx(), through, &src, bounds, &mut dst),
            Err(NormalizeError::Through(_))
        ));
    }

    #[test]
    fn short_source_is_rejected() {
        let mut dst = [SimpleVertex::default(); 2];
        let src = [0u8; 40];
        assert!(matches!(
            Interpreter.normalize(
                ctx(),
                VertexType::canonical(),
                &src,
                IndexBounds::sequential(2),
                &mut dst
            ),
            Err(NormalizeError::SourceTooShort {
                required: 72,
                len: 40
            })
        ));
    }
}
