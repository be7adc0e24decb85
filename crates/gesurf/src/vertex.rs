//! Vertex formats.
use bitos::{bitos, integer::u3};
use color::Rgba8;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use strum::{Display, EnumString, FromRepr};
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Storage format of a single vertex component.
#[bitos(2)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentFormat {
    /// Component is not present.
    #[default]
    None = 0b00,
    /// 8-bit fixed point.
    Fixed8 = 0b01,
    /// 16-bit fixed point.
    Fixed16 = 0b10,
    /// 32-bit float.
    Float = 0b11,
}

impl ComponentFormat {
    /// Size in bytes of a single element in this format.
    #[inline(always)]
    pub fn size(self) -> usize {
        match self {
            Self::None => 0,
            Self::Fixed8 => 1,
            Self::Fixed16 => 2,
            Self::Float => 4,
        }
    }
}

#[bitos(3)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    #[default]
    None = 0b000,
    Reserved0 = 0b001,
    Reserved1 = 0b010,
    Reserved2 = 0b011,
    Rgb565 = 0b100,
    Rgba5551 = 0b101,
    Rgba4444 = 0b110,
    Rgba8888 = 0b111,
}

impl ColorFormat {
    #[inline(always)]
    pub fn size(self) -> usize {
        match self {
            Self::None | Self::Reserved0 | Self::Reserved1 | Self::Reserved2 => 0,
            Self::Rgb565 | Self::Rgba5551 | Self::Rgba4444 => 2,
            Self::Rgba8888 => 4,
        }
    }
}

/// Format of the indices of a draw.
#[bitos(2)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    /// Draw is not indexed.
    #[default]
    None = 0b00,
    U8 = 0b01,
    U16 = 0b10,
    U32 = 0b11,
}

impl IndexFormat {
    #[inline(always)]
    pub fn size(self) -> usize {
        match self {
            Self::None => 0,
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// The vertex type register, describing the layout of the vertices of a draw.
#[bitos(32)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexType {
    #[bits(0..2)]
    pub tex_coords: ComponentFormat,
    #[bits(2..5)]
    pub color: ColorFormat,
    #[bits(5..7)]
    pub normal: ComponentFormat,
    #[bits(7..9)]
    pub position: ComponentFormat,
    #[bits(9..11)]
    pub weight: ComponentFormat,
    #[bits(11..13)]
    pub index: IndexFormat,
    #[bits(14..17)]
    pub weight_count_minus_one: u3,
    #[bits(18..21)]
    pub morph_count_minus_one: u3,
    #[bits(23)]
    pub through: bool,
}

impl VertexType {
    /// The layout of a [`SimpleVertex`]: float texture coordinates, RGBA8888 color, float normal
    /// and float position.
    pub fn canonical() -> Self {
        Self::default()
            .with_tex_coords(ComponentFormat::Float)
            .with_color(ColorFormat::Rgba8888)
            .with_normal(ComponentFormat::Float)
            .with_position(ComponentFormat::Float)
    }

    #[inline(always)]
    pub fn has_tex_coords(&self) -> bool {
        self.tex_coords() != ComponentFormat::None
    }

    #[inline(always)]
    pub fn has_color(&self) -> bool {
        self.color().size() != 0
    }

    #[inline(always)]
    pub fn has_normal(&self) -> bool {
        self.normal() != ComponentFormat::None
    }

    #[inline(always)]
    pub fn weight_count(&self) -> usize {
        self.weight_count_minus_one().value() as usize + 1
    }

    #[inline(always)]
    pub fn morph_count(&self) -> usize {
        self.morph_count_minus_one().value() as usize + 1
    }
}

/// A decoded vertex, the unit both control points and tessellated output are stored as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Immutable, IntoBytes, FromBytes)]
#[repr(C)]
pub struct SimpleVertex {
    pub uv: Vec2,
    pub color: Rgba8,
    pub normal: Vec3,
    pub position: Vec3,
}

const_assert_eq!(size_of::<SimpleVertex>(), 36);

/// Primitive a patch is drawn as.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    FromRepr,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PatchPrimitive {
    #[default]
    Triangles = 0,
    Lines = 1,
    Points = 2,
}

impl PatchPrimitive {
    /// Decodes the two-bit patch primitive field. The fourth encoding behaves like points.
    pub fn from_bits(value: u8) -> Self {
        Self::from_repr(value & 0b11).unwrap_or(Self::Points)
    }

    /// The primitive the tessellated mesh is submitted as.
    pub fn primitive(self) -> Primitive {
        match self {
            Self::Triangles => Primitive::Triangles,
            Self::Lines => Primitive::Lines,
            Self::Points => Primitive::Points,
        }
    }
}

/// Primitive topology of a submitted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}
