//! Engine configuration.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};

/// Largest number of vertices a single submission can address with 16-bit indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Quality of software tessellation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    VariantArray,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Only the corners of each patch are emitted, one quad per tile.
    Low,
    /// Curved tessellation at half the requested density.
    Medium,
    /// Curved tessellation at the requested density.
    #[default]
    High,
}

impl Quality {
    /// Divisor applied to the requested tessellation density.
    #[inline(always)]
    pub fn divisor(self) -> usize {
        match self {
            Self::Low | Self::High => 1,
            Self::Medium => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quality: Quality,
    /// Whether to hand control points to the host GPU for tessellation when the draw module
    /// supports it.
    pub hardware_tessellation: bool,
    /// Whether the draw module rasterizes in software. Disables hardware tessellation.
    pub software_rendering: bool,
    /// Size in bytes of the scratch arena used during a submission.
    pub arena_size: usize,
    /// Capacity of the output vertex buffer. Clamped to [`MAX_VERTICES`].
    pub max_vertices: usize,
}

impl Config {
    /// The vertex capacity actually used, after clamping.
    #[inline(always)]
    pub fn vertex_capacity(&self) -> usize {
        self.max_vertices.clamp(4, MAX_VERTICES)
    }

    /// The index capacity, enough for a full grid over [`Self::vertex_capacity`] vertices.
    #[inline(always)]
    pub fn index_capacity(&self) -> usize {
        self.vertex_capacity() * 6
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: Quality::High,
            hardware_tessellation: false,
            software_rendering: false,
            arena_size: 2 * 1024 * 1024,
            max_vertices: MAX_VERTICES,
        }
    }
}
